// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The admin session record.
//!
//! A session lives only in tab-scoped storage under [`SESSION_KEY`]. Its
//! JSON layout is the one the login page has always written:
//!
//! ```json
//! {"email":"admin@ngo.org","loginTime":1700000000000,"expiresAt":1700007200000,
//!  "sessionId":"sess_…","csrfToken":"csrf_…"}
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Tab storage key of the session record.
pub const SESSION_KEY: &str = "admin_session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "email")]
    pub identifier: String,
    #[serde(rename = "loginTime", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    pub session_id: String,
    pub csrf_token: String,
}

impl Session {
    /// Issue a fresh session for `identifier` valid for `lifetime` from `now`.
    pub fn issue(identifier: impl Into<String>, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            identifier: identifier.into(),
            issued_at: now,
            expires_at: now + lifetime,
            session_id: generate_token("sess"),
            csrf_token: generate_token("csrf"),
        }
    }

    /// A session is valid strictly before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let left = self.expires_at.signed_duration_since(now);
        if left < Duration::zero() {
            Duration::zero()
        } else {
            left
        }
    }

    /// Constant-time CSRF token check.
    pub fn csrf_matches(&self, token: &str) -> bool {
        self.csrf_token.as_bytes().ct_eq(token.as_bytes()).into()
    }

    /// Remaining time as `HH:MM:SS`.
    pub fn remaining_formatted(&self, now: DateTime<Utc>) -> String {
        let secs = self.remaining(now).num_seconds();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// `<prefix>_<32 hex chars>` from 128 bits of OS randomness.
fn generate_token(prefix: &str) -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    format!("{}_{}", prefix, hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_issue_sets_lifetime_and_tokens() {
        let session = Session::issue("admin@ngo.org", now(), Duration::hours(2));
        assert_eq!(session.expires_at, now() + Duration::hours(2));
        assert!(session.session_id.starts_with("sess_"));
        assert_eq!(session.session_id.len(), 5 + 32);
        assert!(session.csrf_token.starts_with("csrf_"));
        let other = Session::issue("admin@ngo.org", now(), Duration::hours(2));
        assert_ne!(session.session_id, other.session_id);
        assert_ne!(session.csrf_token, other.csrf_token);
    }

    #[test]
    fn test_validity_boundary() {
        let session = Session::issue("admin@ngo.org", now(), Duration::hours(2));
        assert!(session.is_valid_at(now()));
        assert!(session.is_valid_at(session.expires_at - Duration::milliseconds(1)));
        assert!(!session.is_valid_at(session.expires_at));
        assert_eq!(session.remaining(session.expires_at + Duration::hours(1)), Duration::zero());
    }

    #[test]
    fn test_json_layout() {
        let session = Session::issue("admin@ngo.org", now(), Duration::hours(2));
        let value: serde_json::Value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["email"], "admin@ngo.org");
        assert_eq!(value["loginTime"], 1_700_000_000_123i64);
        assert_eq!(value["expiresAt"], 1_700_007_200_123i64);
        assert_eq!(value["sessionId"], session.session_id.as_str());
        assert_eq!(value["csrfToken"], session.csrf_token.as_str());
    }

    #[test]
    fn test_csrf_matches() {
        let session = Session::issue("admin@ngo.org", now(), Duration::hours(2));
        let token = session.csrf_token.clone();
        assert!(session.csrf_matches(&token));
        assert!(!session.csrf_matches("csrf_forged"));
    }

    #[test]
    fn test_remaining_formatted() {
        let session = Session::issue("admin@ngo.org", now(), Duration::hours(2));
        assert_eq!(session.remaining_formatted(now()), "02:00:00");
        assert_eq!(
            session.remaining_formatted(now() + Duration::seconds(3725)),
            "00:57:55"
        );
    }
}
