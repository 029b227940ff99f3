// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Dashboard content persisted through the durable file store.

use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;

use siteguard::config::GuardConfig;
use siteguard::content::collections::{item_id, CMS_CONTENT_KEY};
use siteguard::content::{
    CollectionKind, ContentError, ContentItem, ContentRepository, MediaFilter, ACTIVITY_CAPACITY,
};
use siteguard::security::SessionGuard;
use siteguard::store::{JsonFileStore, MemoryStore, Store};

#[test]
fn test_content_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();

    {
        let repo = ContentRepository::new(JsonFileStore::open(&path).unwrap());
        repo.set_field("pages/projects.html", "intro", "Boreholes in 12 villages", now)
            .unwrap();
        repo.add_media("map.png", "image/png", &[1, 2, 3], now).unwrap();
    }

    let repo = ContentRepository::new(JsonFileStore::open(&path).unwrap());
    assert_eq!(
        repo.page_content("pages/projects.html").unwrap()["intro"],
        "Boreholes in 12 villages"
    );
    let images = repo.filter_media(MediaFilter::Images, "map").unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].data, "data:image/png;base64,AQID");
}

#[test]
fn test_guard_and_content_share_durable_store() {
    let dir = tempdir().unwrap();
    let durable = JsonFileStore::open(dir.path().join("local_storage.json")).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();

    let mut guard = SessionGuard::new(&durable, MemoryStore::new(), GuardConfig::default());
    let content = ContentRepository::new(&durable);

    guard.attempt_login("admin@ngo.org", "123", now).unwrap();
    content.set_field("index.html", "title", "Welcome", now).unwrap();
    content.clear_cache(now).unwrap();

    // Clearing the content cache leaves the security log alone
    assert_eq!(guard.security_events().unwrap().len(), 1);
    assert!(guard.current_session(now).is_some());
}

#[test]
fn test_backup_file_restores_into_fresh_store() {
    let dir = tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();

    let source = ContentRepository::new(MemoryStore::new());
    source.set_field("index.html", "title", "Welcome", now).unwrap();
    source.add_media("report.pdf", "application/pdf", b"%PDF-1.4", now).unwrap();
    let backup = source.create_backup(now).unwrap();

    let backup_path = dir.path().join("admin-backup.json");
    std::fs::write(&backup_path, serde_json::to_string_pretty(&backup).unwrap()).unwrap();

    let other = JsonFileStore::open(dir.path().join("other.json")).unwrap();
    let target = ContentRepository::new(other);
    let document = std::fs::read_to_string(&backup_path).unwrap();
    target.restore_backup(&document, now).unwrap();

    assert_eq!(target.page_content("index.html").unwrap()["title"], "Welcome");
    assert_eq!(target.media().unwrap()[0].name, "report.pdf");
    assert!(target.activities().unwrap().len() <= ACTIVITY_CAPACITY);
}

#[test]
fn test_collections_survive_reopen_and_clear_cache() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
    let focus: ContentItem = serde_json::from_value(json!({
        "name": "Education",
        "description": "Schools and libraries",
        "detailedDescription": "<p>Evening classes.</p>",
        "icon": "fas fa-book",
        "statistics": {"schools": "8"}
    }))
    .unwrap();

    let id = {
        let repo = ContentRepository::new(JsonFileStore::open(&path).unwrap());
        let item = repo
            .save_item(CollectionKind::FocusAreas, None, focus, now)
            .unwrap();
        repo.clear_cache(now).unwrap();
        item_id(&item).unwrap().to_string()
    };

    let durable = JsonFileStore::open(&path).unwrap();
    assert!(durable.get(CMS_CONTENT_KEY).unwrap().is_some());
    let repo = ContentRepository::new(durable);
    let item = repo.find_item(CollectionKind::FocusAreas, &id).unwrap();
    assert_eq!(item["statistics"]["schools"], "8");

    // An export written by one store replaces the collection in another
    let export = serde_json::to_string(&repo.export_collections(now).unwrap()).unwrap();
    let target = ContentRepository::new(MemoryStore::new());
    target.import_collections(&export, now).unwrap();
    assert_eq!(target.collections().unwrap(), repo.collections().unwrap());

    let missing = ContentItem::new();
    assert!(matches!(
        target.save_item(CollectionKind::Pages, None, missing, now),
        Err(ContentError::InvalidItem { .. })
    ));
}
