// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Login and session failure taxonomy.
//!
//! Every variant is recoverable: the caller shows [`AttemptError::user_message`]
//! and resets its form. `MalformedStoredState` never reaches a login form;
//! decoders produce it and the guard recovers by treating the record as
//! absent.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AttemptError {
    /// A lock is in force; the attempt was not evaluated.
    #[error("Account locked, retry in {retry_after_secs}s")]
    Locked { retry_after_secs: u64 },

    /// This attempt exhausted the allowance and started a lock.
    #[error("Account locked after {attempts} failed attempts, retry in {retry_after_secs}s")]
    LockedNow { attempts: u32, retry_after_secs: u64 },

    #[error("Invalid credentials, {remaining} attempt(s) remaining")]
    InvalidCredentials { remaining: u32 },

    #[error("Malformed stored state under {key}: {reason}")]
    MalformedStoredState { key: &'static str, reason: String },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AttemptError {
    pub(crate) fn malformed(key: &'static str, reason: impl Into<String>) -> Self {
        AttemptError::MalformedStoredState {
            key,
            reason: reason.into(),
        }
    }

    /// True for both lock variants.
    pub fn is_lockout(&self) -> bool {
        matches!(self, AttemptError::Locked { .. } | AttemptError::LockedNow { .. })
    }

    /// Message for the login form.
    pub fn user_message(&self) -> String {
        match self {
            AttemptError::Locked { .. } => {
                "Account temporarily locked due to multiple failed attempts. \
                 Please try again later."
                    .to_string()
            }
            AttemptError::LockedNow { retry_after_secs, .. } => format!(
                "Account locked due to multiple failed attempts. Please try again in {}.",
                plural(retry_after_secs.div_ceil(60), "minute")
            ),
            AttemptError::InvalidCredentials { remaining } => format!(
                "Invalid credentials. {} remaining.",
                plural(u64::from(*remaining), "attempt")
            ),
            AttemptError::MalformedStoredState { .. } => {
                "Your session could not be read. Please sign in again.".to_string()
            }
            AttemptError::Storage(_) => "Login failed. Please try again.".to_string(),
        }
    }
}

/// `"1 attempt"`, `"2 attempts"`.
pub fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message() {
        let two = AttemptError::InvalidCredentials { remaining: 2 };
        assert_eq!(two.user_message(), "Invalid credentials. 2 attempts remaining.");

        let one = AttemptError::InvalidCredentials { remaining: 1 };
        assert_eq!(one.user_message(), "Invalid credentials. 1 attempt remaining.");
    }

    #[test]
    fn test_locked_now_message_rounds_up_minutes() {
        let err = AttemptError::LockedNow {
            attempts: 3,
            retry_after_secs: 15 * 60,
        };
        assert!(err.user_message().contains("15 minutes"));
        assert!(err.is_lockout());

        let almost = AttemptError::LockedNow {
            attempts: 3,
            retry_after_secs: 61,
        };
        assert!(almost.user_message().contains("2 minutes"));
    }

    #[test]
    fn test_malformed_is_not_lockout() {
        let err = AttemptError::malformed("admin_session", "bad base64");
        assert!(!err.is_lockout());
        assert!(err.to_string().contains("admin_session"));
    }
}
