//! Security Audit Log
//!
//! Append-only record of login, lockout and session events, kept in durable
//! storage under `admin_security_log` as a JSON array and capped to the most
//! recent entries. Every append is mirrored to `tracing`.
//!
//! Log line format (CLI):
//! `2024-01-15 10:23:45 | LOGIN_FAILED    | host=kiosk-1 | {"attempts":2}`

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Store, StoreError};

/// Durable storage key of the log.
pub const SECURITY_LOG_KEY: &str = "admin_security_log";

/// Security event names as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    LoginSuccess,
    LoginFailed,
    AccountLocked,
    LockExpired,
    Logout,
    SessionExtended,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailed => "login_failed",
            Self::AccountLocked => "account_locked",
            Self::LockExpired => "lock_expired",
            Self::Logout => "logout",
            Self::SessionExtended => "session_extended",
        }
    }

    fn is_alert(&self) -> bool {
        matches!(self, Self::LoginFailed | Self::AccountLocked)
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_ascii_uppercase())
    }
}

/// One log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    pub event: SecurityEventKind,
    #[serde(default)]
    pub data: Value,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Host the event came from
    #[serde(default, rename = "userAgent")]
    pub agent: String,
}

impl SecurityEvent {
    pub fn to_log_line(&self) -> String {
        let local_time: DateTime<Local> = self.timestamp.into();
        format!(
            "{} | {:<16} | host={} | {}",
            local_time.format("%Y-%m-%d %H:%M:%S"),
            self.event.to_string(),
            self.agent,
            self.data
        )
    }
}

/// Writer/reader for the capped log. Holds no storage of its own.
#[derive(Debug, Clone)]
pub struct SecurityLog {
    capacity: usize,
    agent: String,
}

impl SecurityLog {
    pub fn new(capacity: usize, agent: impl Into<String>) -> Self {
        Self {
            capacity: capacity.max(1),
            agent: agent.into(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an event, dropping the oldest entries beyond capacity.
    pub fn record(
        &self,
        store: &impl Store,
        event: SecurityEventKind,
        data: Value,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if event.is_alert() {
            tracing::warn!("SECURITY_EVENT | event={} data={}", event, data);
        } else {
            tracing::info!("SECURITY_EVENT | event={} data={}", event, data);
        }

        let mut entries = self.entries(store)?;
        entries.push(SecurityEvent {
            event,
            data,
            timestamp: now,
            agent: self.agent.clone(),
        });
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }

        // Serializing plain structs of strings and numbers does not fail.
        let encoded = serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string());
        store.set(SECURITY_LOG_KEY, &encoded)
    }

    /// All retained entries, oldest first. An unreadable log reads as empty.
    pub fn entries(&self, store: &impl Store) -> Result<Vec<SecurityEvent>, StoreError> {
        let Some(raw) = store.get(SECURITY_LOG_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("SECURITY_LOG_DISCARDED | reason={}", e);
                Ok(Vec::new())
            }
        }
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent(
        &self,
        store: &impl Store,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        let mut entries = self.entries(store)?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }
}

// ============================================================================
// TESTS
// ============================================================================
