// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Failed login attempt tracking and lockout.
//!
//! Persisted layout (durable storage, values are decimal strings):
//!
//! | key                    | value                                  |
//! |------------------------|----------------------------------------|
//! | `admin_login_attempts` | failed attempt count (absent = 0)      |
//! | `admin_last_attempt`   | epoch ms of the last failed attempt    |
//! | `admin_account_locked` | epoch ms when the lock began           |

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::AttemptError;
use crate::store::{Store, StoreError};

pub const LOGIN_ATTEMPTS_KEY: &str = "admin_login_attempts";
pub const LAST_ATTEMPT_KEY: &str = "admin_last_attempt";
pub const ACCOUNT_LOCKED_KEY: &str = "admin_account_locked";

/// Persisted failed-attempt state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttemptState {
    pub count: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl LoginAttemptState {
    /// Read the state from `store`.
    ///
    /// A value that does not parse is treated as absent, logged, and removed,
    /// so one corrupt key cannot wedge the login form.
    pub fn load(store: &impl Store) -> Result<Self, StoreError> {
        let count = read_field(store, LOGIN_ATTEMPTS_KEY, |raw| raw.trim().parse::<u32>().ok())?
            .unwrap_or(0);
        let last_attempt_at = read_field(store, LAST_ATTEMPT_KEY, parse_epoch_millis)?;
        let locked_at = read_field(store, ACCOUNT_LOCKED_KEY, parse_epoch_millis)?;

        Ok(Self {
            count,
            last_attempt_at,
            locked_at,
        })
    }

    /// Record one more failure at `now` and persist it.
    pub fn record_failure(
        &mut self,
        store: &impl Store,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.count = self.count.saturating_add(1);
        self.last_attempt_at = Some(now);
        store.set(LOGIN_ATTEMPTS_KEY, &self.count.to_string())?;
        store.set(LAST_ATTEMPT_KEY, &now.timestamp_millis().to_string())
    }

    /// Begin a lock at `now` and persist it.
    pub fn lock(&mut self, store: &impl Store, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.locked_at = Some(now);
        store.set(ACCOUNT_LOCKED_KEY, &now.timestamp_millis().to_string())
    }

    /// Forget all failures and any lock.
    pub fn clear(&mut self, store: &impl Store) -> Result<(), StoreError> {
        *self = Self::default();
        store.remove(LOGIN_ATTEMPTS_KEY)?;
        store.remove(LAST_ATTEMPT_KEY)?;
        store.remove(ACCOUNT_LOCKED_KEY)
    }

    /// End of the lock, if one has been recorded.
    pub fn locked_until(&self, policy: &LockoutPolicy) -> Option<DateTime<Utc>> {
        self.locked_at.map(|at| at + policy.lockout_duration)
    }
}

fn read_field<T>(
    store: &impl Store,
    key: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match parse(&raw) {
        Some(value) => Ok(Some(value)),
        None => {
            let err = AttemptError::malformed(key, format!("unparseable value {:?}", raw));
            tracing::warn!("ATTEMPT_STATE_DISCARDED | {}", err);
            store.remove(key)?;
            Ok(None)
        }
    }
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis = raw.trim().parse::<i64>().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

/// How many failures are allowed and how long the lock lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::config::DEFAULT_MAX_LOGIN_ATTEMPTS,
            lockout_duration: Duration::minutes(15),
        }
    }
}

impl LockoutPolicy {
    /// Attempts left before a lock, never negative.
    pub fn remaining(&self, state: &LoginAttemptState) -> u32 {
        self.max_attempts.saturating_sub(state.count)
    }

    /// True once the failure count has reached the maximum.
    pub fn is_exhausted(&self, state: &LoginAttemptState) -> bool {
        state.count >= self.max_attempts
    }

    /// True while a recorded lock is still in force at `now`.
    pub fn is_lock_active(&self, state: &LoginAttemptState, now: DateTime<Utc>) -> bool {
        state
            .locked_at
            .map(|at| now.signed_duration_since(at) < self.lockout_duration)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_absent_state_is_zero() {
        let store = MemoryStore::new();
        let state = LoginAttemptState::load(&store).unwrap();
        assert_eq!(state, LoginAttemptState::default());
    }

    #[test]
    fn test_failures_and_lock_persist() {
        let store = MemoryStore::new();
        let mut state = LoginAttemptState::load(&store).unwrap();
        state.record_failure(&store, at(0)).unwrap();
        state.record_failure(&store, at(5)).unwrap();
        state.lock(&store, at(5)).unwrap();

        let reloaded = LoginAttemptState::load(&store).unwrap();
        assert_eq!(reloaded.count, 2);
        assert_eq!(reloaded.last_attempt_at, Some(at(5)));
        assert_eq!(reloaded.locked_at, Some(at(5)));
        assert_eq!(store.get(LOGIN_ATTEMPTS_KEY).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_clear_removes_every_key() {
        let store = MemoryStore::new();
        let mut state = LoginAttemptState::default();
        state.record_failure(&store, at(0)).unwrap();
        state.lock(&store, at(0)).unwrap();

        state.clear(&store).unwrap();
        assert!(store.is_empty());
        assert_eq!(state.count, 0);
    }

    #[test]
    fn test_corrupt_values_are_dropped() {
        let store = MemoryStore::new();
        store.set(LOGIN_ATTEMPTS_KEY, "three").unwrap();
        store.set(ACCOUNT_LOCKED_KEY, "yesterday").unwrap();
        store.set(LAST_ATTEMPT_KEY, "1700000000000").unwrap();

        let state = LoginAttemptState::load(&store).unwrap();
        assert_eq!(state.count, 0);
        assert_eq!(state.locked_at, None);
        assert_eq!(state.last_attempt_at, Some(at(0)));
        assert!(!store.contains_key(LOGIN_ATTEMPTS_KEY));
        assert!(!store.contains_key(ACCOUNT_LOCKED_KEY));
    }

    #[test]
    fn test_policy_lock_window() {
        let policy = LockoutPolicy::default();
        let state = LoginAttemptState {
            count: 3,
            last_attempt_at: Some(at(0)),
            locked_at: Some(at(0)),
        };

        assert!(policy.is_exhausted(&state));
        assert_eq!(policy.remaining(&state), 0);
        assert!(policy.is_lock_active(&state, at(0)));
        assert!(policy.is_lock_active(&state, at(15 * 60 - 1)));
        assert!(!policy.is_lock_active(&state, at(15 * 60)));
        assert_eq!(state.locked_until(&policy), Some(at(15 * 60)));
    }
}
