// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Backup and export documents.
//!
//! Both are pretty-printed JSON with a `version` of `"1.0.0"`. A backup holds
//! content and media and replaces both on restore; an export holds content
//! and the page catalogue and is merged on import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::MediaItem;
use super::{ContentData, PageRef};

pub const ARCHIVE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub content_data: ContentData,
    #[serde(default)]
    pub media_files: Vec<MediaItem>,
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentExport {
    pub timestamp: DateTime<Utc>,
    pub content_data: ContentData,
    #[serde(default)]
    pub pages: Vec<PageRef>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    ARCHIVE_VERSION.to_string()
}

/// File name offered for a backup taken at `now`.
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("admin-backup-{}.json", now.format("%Y-%m-%d"))
}

/// File name offered for an export taken at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("content-export-{}.json", now.format("%Y-%m-%d"))
}
