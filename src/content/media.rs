// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Media library records.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// An uploaded file, stored inline as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub data: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub upload_date: DateTime<Utc>,
}

impl MediaItem {
    /// Build a record for `bytes`. The title defaults to the file stem.
    pub fn new(name: &str, mime_type: &str, bytes: &[u8], now: DateTime<Utc>) -> Self {
        let title = name.split('.').next().unwrap_or(name).to_string();
        Self {
            id: generate_media_id(now),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            data: data_url(mime_type, bytes),
            title,
            description: String::new(),
            alt_text: String::new(),
            tags: Vec::new(),
            upload_date: now,
        }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }

    /// Case-insensitive match on name, title, description or any tag.
    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }

    pub fn apply_details(&mut self, details: MediaDetails) {
        self.title = details.title;
        self.description = details.description;
        self.alt_text = details.alt_text;
        self.tags = details.tags;
    }
}

/// Editable metadata of a [`MediaItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDetails {
    pub title: String,
    pub description: String,
    pub alt_text: String,
    pub tags: Vec<String>,
}

impl MediaDetails {
    /// Split a comma-separated tag list, dropping blanks.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Pdf,
    Document,
    Spreadsheet,
    File,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime.contains("pdf") {
            MediaKind::Pdf
        } else if mime.contains("word") || mime.contains("document") {
            MediaKind::Document
        } else if mime.contains("spreadsheet") || mime.contains("excel") {
            MediaKind::Spreadsheet
        } else {
            MediaKind::File
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
            MediaKind::Pdf => "PDF",
            MediaKind::Document => "Document",
            MediaKind::Spreadsheet => "Spreadsheet",
            MediaKind::File => "File",
        }
    }
}

/// Media library filter. `Documents` is everything that is not an image or video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaFilter {
    #[default]
    All,
    Images,
    Videos,
    Documents,
}

impl MediaFilter {
    pub fn accepts(&self, item: &MediaItem) -> bool {
        match self {
            MediaFilter::All => true,
            MediaFilter::Images => item.kind() == MediaKind::Image,
            MediaFilter::Videos => item.kind() == MediaKind::Video,
            MediaFilter::Documents => !matches!(item.kind(), MediaKind::Image | MediaKind::Video),
        }
    }
}

impl std::str::FromStr for MediaFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(MediaFilter::All),
            "images" | "image" => Ok(MediaFilter::Images),
            "videos" | "video" => Ok(MediaFilter::Videos),
            "documents" | "document" | "docs" => Ok(MediaFilter::Documents),
            other => Err(format!("unknown media filter: {}", other)),
        }
    }
}

/// Guess a MIME type from a file extension.
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

fn generate_media_id(now: DateTime<Utc>) -> String {
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    format!("media_{}_{}", now.timestamp_millis(), hex::encode(bytes))
}
