// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Dashboard activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable storage key of the feed.
pub const ACTIVITIES_KEY: &str = "admin_activities";

/// Entries kept, newest first.
pub const ACTIVITY_CAPACITY: usize = 50;

pub const ICON_EDIT: &str = "fas fa-edit";
pub const ICON_UPLOAD: &str = "fas fa-upload";
pub const ICON_TRASH: &str = "fas fa-trash";
pub const ICON_DOWNLOAD: &str = "fas fa-download";
pub const ICON_EXPORT: &str = "fas fa-file-export";
pub const ICON_IMPORT: &str = "fas fa-file-import";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    pub fn new(text: impl Into<String>, icon: &str, now: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            icon: icon.to_string(),
            timestamp: now,
        }
    }
}

/// Put `activity` at the front and drop anything past capacity.
pub fn push_front(feed: &mut Vec<Activity>, activity: Activity) {
    feed.insert(0, activity);
    feed.truncate(ACTIVITY_CAPACITY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_push_front_caps_feed() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut feed = Vec::new();
        for i in 0..60 {
            push_front(
                &mut feed,
                Activity::new(format!("edit {}", i), ICON_EDIT, start + Duration::minutes(i)),
            );
        }
        assert_eq!(feed.len(), ACTIVITY_CAPACITY);
        assert_eq!(feed[0].text, "edit 59");
        assert_eq!(feed[49].text, "edit 10");
    }
}
