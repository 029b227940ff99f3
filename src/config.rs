// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Guard configuration.
//!
//! Loaded from `<data-dir>/config.json` (default `~/.siteguard`). Every field
//! has a serde default so a partial or empty file works, and values are
//! clamped by [`GuardConfig::validated`] before the guard sees them.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 3;
pub const DEFAULT_LOCKOUT_SECS: u64 = 15 * 60;
pub const DEFAULT_SESSION_SECS: u64 = 2 * 60 * 60;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;
pub const DEFAULT_EXPIRY_WARNING_SECS: u64 = 5 * 60;
pub const DEFAULT_LOGIN_DELAY_MIN_MS: u64 = 1000;
pub const DEFAULT_LOGIN_DELAY_MAX_MS: u64 = 2000;
pub const DEFAULT_SECURITY_LOG_CAPACITY: usize = 100;

/// Longest lockout, session or idle window accepted (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Longest artificial login delay accepted.
pub const MAX_LOGIN_DELAY_MS: u64 = 60 * 1000;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// How the session record is written to tab storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// Plain JSON.
    #[default]
    Plain,
    /// XOR with a fingerprint-derived key, then base64. Not confidential.
    Obscured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Failed attempts that trigger a lockout
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,

    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,

    /// Absolute session lifetime
    #[serde(default = "default_session_secs")]
    pub session_secs: u64,

    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Lead time of the expiry warning before `expiresAt`
    #[serde(default = "default_expiry_warning_secs")]
    pub expiry_warning_secs: u64,

    #[serde(default = "default_login_delay_min_ms")]
    pub login_delay_min_ms: u64,

    #[serde(default = "default_login_delay_max_ms")]
    pub login_delay_max_ms: u64,

    #[serde(default = "default_security_log_capacity")]
    pub security_log_capacity: usize,

    #[serde(default)]
    pub session_encoding: EncodingMode,

    /// Key material for [`EncodingMode::Obscured`]; host name when unset
    #[serde(default)]
    pub fingerprint: Option<String>,
}

fn default_max_login_attempts() -> u32 {
    DEFAULT_MAX_LOGIN_ATTEMPTS
}

fn default_lockout_secs() -> u64 {
    DEFAULT_LOCKOUT_SECS
}

fn default_session_secs() -> u64 {
    DEFAULT_SESSION_SECS
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_expiry_warning_secs() -> u64 {
    DEFAULT_EXPIRY_WARNING_SECS
}

fn default_login_delay_min_ms() -> u64 {
    DEFAULT_LOGIN_DELAY_MIN_MS
}

fn default_login_delay_max_ms() -> u64 {
    DEFAULT_LOGIN_DELAY_MAX_MS
}

fn default_security_log_capacity() -> usize {
    DEFAULT_SECURITY_LOG_CAPACITY
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            lockout_secs: DEFAULT_LOCKOUT_SECS,
            session_secs: DEFAULT_SESSION_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            expiry_warning_secs: DEFAULT_EXPIRY_WARNING_SECS,
            login_delay_min_ms: DEFAULT_LOGIN_DELAY_MIN_MS,
            login_delay_max_ms: DEFAULT_LOGIN_DELAY_MAX_MS,
            security_log_capacity: DEFAULT_SECURITY_LOG_CAPACITY,
            session_encoding: EncodingMode::Plain,
            fingerprint: None,
        }
    }
}

impl GuardConfig {
    /// Clamp values into a usable range.
    ///
    /// - at least one login attempt
    /// - lockout, session and idle windows of at most [`MAX_DURATION_SECS`]
    /// - session and idle lifetimes of at least one second
    /// - the expiry warning strictly inside the session lifetime
    /// - login delays of at most [`MAX_LOGIN_DELAY_MS`], min before max
    /// - a security log holding at least one entry
    pub fn validated(mut self) -> Self {
        clamp_max("lockout_secs", &mut self.lockout_secs, MAX_DURATION_SECS);
        clamp_max("session_secs", &mut self.session_secs, MAX_DURATION_SECS);
        clamp_max("idle_timeout_secs", &mut self.idle_timeout_secs, MAX_DURATION_SECS);
        clamp_max("login_delay_min_ms", &mut self.login_delay_min_ms, MAX_LOGIN_DELAY_MS);
        clamp_max("login_delay_max_ms", &mut self.login_delay_max_ms, MAX_LOGIN_DELAY_MS);

        if self.max_login_attempts == 0 {
            tracing::warn!("CONFIG_CLAMPED | field=max_login_attempts requested=0 used=1");
            self.max_login_attempts = 1;
        }
        if self.session_secs == 0 {
            tracing::warn!("CONFIG_CLAMPED | field=session_secs requested=0 used=1");
            self.session_secs = 1;
        }
        if self.idle_timeout_secs == 0 {
            tracing::warn!("CONFIG_CLAMPED | field=idle_timeout_secs requested=0 used=1");
            self.idle_timeout_secs = 1;
        }
        if self.expiry_warning_secs >= self.session_secs {
            let clamped = self.session_secs / 2;
            tracing::warn!(
                "CONFIG_CLAMPED | field=expiry_warning_secs requested={} used={}",
                self.expiry_warning_secs,
                clamped
            );
            self.expiry_warning_secs = clamped;
        }
        if self.login_delay_min_ms > self.login_delay_max_ms {
            tracing::warn!(
                "CONFIG_CLAMPED | field=login_delay requested={}..{}ms used={}..{}ms",
                self.login_delay_min_ms,
                self.login_delay_max_ms,
                self.login_delay_max_ms,
                self.login_delay_min_ms
            );
            std::mem::swap(&mut self.login_delay_min_ms, &mut self.login_delay_max_ms);
        }
        if self.security_log_capacity == 0 {
            tracing::warn!("CONFIG_CLAMPED | field=security_log_capacity requested=0 used=1");
            self.security_log_capacity = 1;
        }
        self
    }

    pub fn lockout_duration(&self) -> Duration {
        secs(self.lockout_secs)
    }

    pub fn session_duration(&self) -> Duration {
        secs(self.session_secs)
    }

    pub fn idle_duration(&self) -> Duration {
        secs(self.idle_timeout_secs)
    }

    pub fn expiry_warning_lead(&self) -> Duration {
        secs(self.expiry_warning_secs)
    }

    /// Fingerprint used to derive the obscuring key.
    pub fn effective_fingerprint(&self) -> String {
        self.fingerprint.clone().unwrap_or_else(host_agent)
    }

    /// Load `config.json` from `data_dir`, writing defaults when it is missing.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            let config = Self::default();
            config.save(data_dir)?;
            config
        };
        Ok(config.validated())
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }
}

fn clamp_max(field: &str, value: &mut u64, max: u64) {
    if *value > max {
        tracing::warn!("CONFIG_CLAMPED | field={} requested={} used={}", field, value, max);
        *value = max;
    }
}

/// Saturates at [`MAX_DURATION_SECS`] for values `validated` would clamp.
fn secs(value: u64) -> Duration {
    let capped = value.min(MAX_DURATION_SECS) as i64;
    Duration::try_seconds(capped).unwrap_or(Duration::zero())
}

/// Default data directory (`~/.siteguard`).
pub fn default_data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".siteguard"))
}

/// Host name, standing in for the browser user agent.
pub fn host_agent() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_login_page() {
        let config = GuardConfig::default();
        assert_eq!(config.max_login_attempts, 3);
        assert_eq!(config.lockout_duration(), Duration::minutes(15));
        assert_eq!(config.session_duration(), Duration::hours(2));
        assert_eq!(config.idle_duration(), Duration::minutes(30));
        assert_eq!(config.expiry_warning_lead(), Duration::minutes(5));
        assert_eq!(config.security_log_capacity, 100);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let config: GuardConfig =
            serde_json::from_str(r#"{"max_login_attempts": 5, "session_encoding": "obscured"}"#)
                .unwrap();
        assert_eq!(config.max_login_attempts, 5);
        assert_eq!(config.session_encoding, EncodingMode::Obscured);
        assert_eq!(config.lockout_secs, DEFAULT_LOCKOUT_SECS);
    }

    #[test]
    fn test_validated_clamps() {
        let config = GuardConfig {
            max_login_attempts: 0,
            session_secs: 60,
            expiry_warning_secs: 600,
            login_delay_min_ms: 3000,
            login_delay_max_ms: 1000,
            security_log_capacity: 0,
            ..GuardConfig::default()
        }
        .validated();

        assert_eq!(config.max_login_attempts, 1);
        assert_eq!(config.expiry_warning_secs, 30);
        assert_eq!(config.login_delay_min_ms, 1000);
        assert_eq!(config.login_delay_max_ms, 3000);
        assert_eq!(config.security_log_capacity, 1);
    }

    #[test]
    fn test_validated_clamps_huge_durations() {
        let config = GuardConfig {
            lockout_secs: u64::MAX,
            session_secs: 20_000_000_000_000,
            idle_timeout_secs: 10_000_000_000_000_000,
            login_delay_min_ms: u64::MAX,
            login_delay_max_ms: u64::MAX,
            ..GuardConfig::default()
        }
        .validated();

        assert_eq!(config.lockout_secs, MAX_DURATION_SECS);
        assert_eq!(config.session_secs, MAX_DURATION_SECS);
        assert_eq!(config.idle_timeout_secs, MAX_DURATION_SECS);
        assert_eq!(config.login_delay_max_ms, MAX_LOGIN_DELAY_MS);
        assert_eq!(config.session_duration(), Duration::days(365));
        assert_eq!(config.expiry_warning_lead(), Duration::minutes(5));
    }

    #[test]
    fn test_unvalidated_huge_duration_saturates() {
        let config = GuardConfig {
            session_secs: u64::MAX,
            ..GuardConfig::default()
        };
        assert_eq!(config.session_duration(), Duration::days(365));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempdir().unwrap();
        let config = GuardConfig::load(dir.path()).unwrap();
        assert_eq!(config, GuardConfig::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());

        let again = GuardConfig::load(dir.path()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_explicit_fingerprint_wins() {
        let config = GuardConfig {
            fingerprint: Some("Mozilla/5.0en-US1920x1080".to_string()),
            ..GuardConfig::default()
        };
        assert_eq!(config.effective_fingerprint(), "Mozilla/5.0en-US1920x1080");
    }
}
