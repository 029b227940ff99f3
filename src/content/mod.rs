// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Dashboard Content Store
//!
//! Editable page content, the media library and the activity feed, kept in
//! durable storage next to the guard's attempt state.
//!
//! ## Keys
//!
//! | key                  | value                                         |
//! |----------------------|-----------------------------------------------|
//! | `admin_content_data` | `{page path: {field: value}}`                 |
//! | `admin_media_files`  | `[MediaItem]`                                 |
//! | `admin_activities`   | `[Activity]`, newest first, at most 50        |
//! | `admin_last_updated` | RFC 3339 time of the last content save        |
//! | `admin_last_backup`  | RFC 3339 time of the last backup              |
//! | `cms_content`        | typed collections, see [`collections`]        |
//! | `cms_last_updated`   | RFC 3339 time of the last collection save     |
//!
//! A stored value that does not parse reads as empty and is overwritten by
//! the next save. Documents handed in by the user (backups, imports) are
//! validated first and rejected whole.

pub mod activity;
pub mod archive;
pub mod collections;
pub mod media;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Store, StoreError};

pub use activity::{Activity, ACTIVITIES_KEY, ACTIVITY_CAPACITY};
pub use archive::{Backup, ContentExport, ARCHIVE_VERSION};
pub use collections::{
    CollectionKind, Collections, CollectionsExport, ContentItem, FieldDef, FieldType,
};
pub use media::{MediaDetails, MediaFilter, MediaItem, MediaKind};

pub const CONTENT_DATA_KEY: &str = "admin_content_data";
pub const MEDIA_FILES_KEY: &str = "admin_media_files";
pub const LAST_UPDATED_KEY: &str = "admin_last_updated";
pub const LAST_BACKUP_KEY: &str = "admin_last_backup";

/// Field values of one page, in edit order.
pub type PageContent = IndexMap<String, String>;

/// All edited pages, keyed by page path.
pub type ContentData = IndexMap<String, PageContent>;

/// A page of the site that the dashboard can edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub path: String,
    pub name: String,
}

impl PageRef {
    fn new(path: &str, name: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
        }
    }
}

/// The site's page catalogue.
pub fn site_pages() -> Vec<PageRef> {
    vec![
        PageRef::new("index.html", "Home Page"),
        PageRef::new("pages/about/mission.html", "About - Mission"),
        PageRef::new("pages/about/vision.html", "About - Vision"),
        PageRef::new("pages/about/team.html", "About - Team"),
        PageRef::new("pages/about/organization.html", "About - Organization"),
        PageRef::new("pages/about/governance.html", "About - Governance"),
        PageRef::new("pages/about/locations.html", "About - Locations"),
        PageRef::new("pages/projects.html", "Projects"),
        PageRef::new("pages/focus-areas/agriculture.html", "Focus Areas - Agriculture"),
    ]
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Media not found: {0}")]
    MediaNotFound(String),

    #[error("No item '{id}' in {collection}")]
    ItemNotFound {
        collection: CollectionKind,
        id: String,
    },

    #[error("Invalid {collection} item: '{field}' {reason}")]
    InvalidItem {
        collection: CollectionKind,
        field: String,
        reason: String,
    },

    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Figures shown on the dashboard overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_pages: usize,
    pub total_media: usize,
    pub editable_fields: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_backup: Option<DateTime<Utc>>,
}

/// Content, media and activity over a durable [`Store`].
pub struct ContentRepository<S: Store> {
    store: S,
    pages: Vec<PageRef>,
}

impl<S: Store> ContentRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            pages: site_pages(),
        }
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    /// Resolve a page by path or (case-insensitive) display name.
    pub fn find_page(&self, query: &str) -> Option<&PageRef> {
        self.pages
            .iter()
            .find(|p| p.path == query || p.name.eq_ignore_ascii_case(query))
    }

    // ------------------------------------------------------------------
    // Page content
    // ------------------------------------------------------------------

    pub fn content(&self) -> Result<ContentData> {
        read_json(&self.store, CONTENT_DATA_KEY)
    }

    pub fn page_content(&self, page: &str) -> Result<PageContent> {
        Ok(self.content()?.shift_remove(page).unwrap_or_default())
    }

    pub fn set_field(
        &self,
        page: &str,
        field: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut content = self.content()?;
        content
            .entry(page.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        self.save_content(&content, now)?;
        tracing::info!("CONTENT_UPDATED | page={} field={}", page, field);
        self.add_activity(
            format!("Updated {} on {}", field, self.page_label(page)),
            activity::ICON_EDIT,
            now,
        )
    }

    /// Remove one field; returns whether it existed. Empty pages are dropped.
    pub fn remove_field(&self, page: &str, field: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut content = self.content()?;
        let Some(fields) = content.get_mut(page) else {
            return Ok(false);
        };
        if fields.shift_remove(field).is_none() {
            return Ok(false);
        }
        if fields.is_empty() {
            content.shift_remove(page);
        }
        self.save_content(&content, now)?;
        self.add_activity(
            format!("Removed {} from {}", field, self.page_label(page)),
            activity::ICON_TRASH,
            now,
        )?;
        Ok(true)
    }

    fn save_content(&self, content: &ContentData, now: DateTime<Utc>) -> Result<()> {
        write_json(&self.store, CONTENT_DATA_KEY, content)?;
        self.store.set(LAST_UPDATED_KEY, &now.to_rfc3339())?;
        Ok(())
    }

    fn page_label(&self, page: &str) -> String {
        self.find_page(page)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| page.to_string())
    }

    // ------------------------------------------------------------------
    // Media
    // ------------------------------------------------------------------

    pub fn media(&self) -> Result<Vec<MediaItem>> {
        read_json(&self.store, MEDIA_FILES_KEY)
    }

    pub fn find_media(&self, id: &str) -> Result<MediaItem> {
        self.media()?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ContentError::MediaNotFound(id.to_string()))
    }

    pub fn add_media(
        &self,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<MediaItem> {
        let item = MediaItem::new(name, mime_type, bytes, now);
        let mut media = self.media()?;
        media.push(item.clone());
        write_json(&self.store, MEDIA_FILES_KEY, &media)?;
        tracing::info!("MEDIA_ADDED | id={} name={} bytes={}", item.id, item.name, item.size);
        self.add_activity(format!("Uploaded media file: {}", name), activity::ICON_UPLOAD, now)?;
        Ok(item)
    }

    pub fn update_media_details(
        &self,
        id: &str,
        details: MediaDetails,
        now: DateTime<Utc>,
    ) -> Result<MediaItem> {
        let mut media = self.media()?;
        let item = media
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ContentError::MediaNotFound(id.to_string()))?;
        item.apply_details(details);
        let updated = item.clone();
        write_json(&self.store, MEDIA_FILES_KEY, &media)?;
        self.add_activity(
            format!("Updated media details: {}", updated.name),
            activity::ICON_EDIT,
            now,
        )?;
        Ok(updated)
    }

    pub fn delete_media(&self, id: &str, now: DateTime<Utc>) -> Result<MediaItem> {
        let mut media = self.media()?;
        let index = media
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ContentError::MediaNotFound(id.to_string()))?;
        let removed = media.remove(index);
        write_json(&self.store, MEDIA_FILES_KEY, &media)?;
        tracing::info!("MEDIA_DELETED | id={} name={}", removed.id, removed.name);
        self.add_activity(
            format!("Deleted media file: {}", removed.name),
            activity::ICON_TRASH,
            now,
        )?;
        Ok(removed)
    }

    pub fn filter_media(&self, filter: MediaFilter, search: &str) -> Result<Vec<MediaItem>> {
        Ok(self
            .media()?
            .into_iter()
            .filter(|m| filter.accepts(m) && m.matches_search(search))
            .collect())
    }

    // ------------------------------------------------------------------
    // Activity
    // ------------------------------------------------------------------

    pub fn activities(&self) -> Result<Vec<Activity>> {
        read_json(&self.store, ACTIVITIES_KEY)
    }

    pub fn recent_activity(&self, limit: usize) -> Result<Vec<Activity>> {
        let mut feed = self.activities()?;
        feed.truncate(limit);
        Ok(feed)
    }

    pub fn add_activity(
        &self,
        text: impl Into<String>,
        icon: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut feed = self.activities()?;
        activity::push_front(&mut feed, Activity::new(text, icon, now));
        write_json(&self.store, ACTIVITIES_KEY, &feed)
    }

    // ------------------------------------------------------------------
    // Backup, export, maintenance
    // ------------------------------------------------------------------

    /// Snapshot content and media, and stamp the last-backup time.
    pub fn create_backup(&self, now: DateTime<Utc>) -> Result<Backup> {
        let backup = Backup {
            timestamp: now,
            content_data: self.content()?,
            media_files: self.media()?,
            version: ARCHIVE_VERSION.to_string(),
        };
        self.store.set(LAST_BACKUP_KEY, &now.to_rfc3339())?;
        self.add_activity("Created system backup", activity::ICON_DOWNLOAD, now)?;
        Ok(backup)
    }

    /// Replace content and media with those of a backup document.
    pub fn restore_backup(&self, document: &str, now: DateTime<Utc>) -> Result<Backup> {
        let backup: Backup = serde_json::from_str(document)
            .map_err(|e| ContentError::InvalidDocument(format!("backup: {}", e)))?;
        self.save_content(&backup.content_data, now)?;
        write_json(&self.store, MEDIA_FILES_KEY, &backup.media_files)?;
        tracing::info!(
            "BACKUP_RESTORED | taken={} pages={} media={}",
            backup.timestamp.to_rfc3339(),
            backup.content_data.len(),
            backup.media_files.len()
        );
        self.add_activity("Restored system backup", activity::ICON_UPLOAD, now)?;
        Ok(backup)
    }

    pub fn export_content(&self, now: DateTime<Utc>) -> Result<ContentExport> {
        let export = ContentExport {
            timestamp: now,
            content_data: self.content()?,
            pages: self.pages.clone(),
            version: ARCHIVE_VERSION.to_string(),
        };
        self.add_activity("Exported content data", activity::ICON_EXPORT, now)?;
        Ok(export)
    }

    /// Merge an export document into stored content. An imported page
    /// replaces the stored page of the same path. Returns the pages imported.
    pub fn import_content(&self, document: &str, now: DateTime<Utc>) -> Result<usize> {
        let incoming: ContentExport = serde_json::from_str(document)
            .map_err(|e| ContentError::InvalidDocument(format!("export: {}", e)))?;
        let imported = incoming.content_data.len();

        let mut content = self.content()?;
        content.extend(incoming.content_data);
        self.save_content(&content, now)?;
        tracing::info!("CONTENT_IMPORTED | pages={}", imported);
        self.add_activity("Imported content data", activity::ICON_IMPORT, now)?;
        Ok(imported)
    }

    /// Drop content, media and the activity feed.
    pub fn clear_cache(&self, now: DateTime<Utc>) -> Result<()> {
        self.store.remove(CONTENT_DATA_KEY)?;
        self.store.remove(MEDIA_FILES_KEY)?;
        self.store.remove(ACTIVITIES_KEY)?;
        tracing::warn!("CONTENT_CLEARED");
        self.add_activity("Cleared system cache", activity::ICON_TRASH, now)
    }

    /// Serialized content size plus the recorded size of every media file.
    pub fn storage_usage_bytes(&self) -> Result<u64> {
        let content = self.content()?;
        let content_bytes = serde_json::to_string(&content)
            .map_err(|source| ContentError::Encode {
                key: CONTENT_DATA_KEY,
                source,
            })?
            .len() as u64;
        let media_bytes: u64 = self.media()?.iter().map(|m| m.size).sum();
        Ok(content_bytes + media_bytes)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        Ok(DashboardStats {
            total_pages: self.pages.len(),
            total_media: self.media()?.len(),
            editable_fields: self.content()?.values().map(IndexMap::len).sum(),
            last_updated: read_timestamp(&self.store, LAST_UPDATED_KEY)?,
            last_backup: read_timestamp(&self.store, LAST_BACKUP_KEY)?,
        })
    }
}

fn read_json<T>(store: &impl Store, key: &'static str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!("CONTENT_DISCARDED | key={} reason={}", key, e);
            Ok(T::default())
        }
    }
}

fn write_json<T: Serialize>(store: &impl Store, key: &'static str, value: &T) -> Result<()> {
    let encoded =
        serde_json::to_string(value).map_err(|source| ContentError::Encode { key, source })?;
    store.set(key, &encoded)?;
    Ok(())
}

fn read_timestamp(store: &impl Store, key: &'static str) -> Result<Option<DateTime<Utc>>> {
    Ok(store
        .get(key)?
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|t| t.with_timezone(&Utc)))
}

// ============================================================================
// TESTS
// ============================================================================
