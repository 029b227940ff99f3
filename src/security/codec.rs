// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Session record encoding.
//!
//! [`EncodingMode::Obscured`] XORs the JSON with a key derived from a host
//! fingerprint and base64-encodes the result. The key is derivable by
//! anyone who can read the storage, so this only keeps the record from
//! being human-readable at a glance. It is NOT encryption, and
//! [`EncodingMode::Plain`] is exactly as safe.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::EncodingMode;
use crate::error::AttemptError;
use crate::security::session::{Session, SESSION_KEY};

/// Key length taken from the base64 form of the fingerprint.
const OBSCURING_KEY_LEN: usize = 32;

const FALLBACK_FINGERPRINT: &str = "siteguard";

#[derive(Clone)]
pub struct SessionCodec {
    mode: EncodingMode,
    key: Vec<u8>,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").field("mode", &self.mode).finish()
    }
}

impl SessionCodec {
    pub fn plain() -> Self {
        Self {
            mode: EncodingMode::Plain,
            key: Vec::new(),
        }
    }

    /// Obscuring codec keyed on the first 32 base64 characters of `fingerprint`.
    pub fn obscured(fingerprint: &str) -> Self {
        let fingerprint = if fingerprint.is_empty() {
            FALLBACK_FINGERPRINT
        } else {
            fingerprint
        };
        let mut key = STANDARD.encode(fingerprint).into_bytes();
        key.truncate(OBSCURING_KEY_LEN);
        Self {
            mode: EncodingMode::Obscured,
            key,
        }
    }

    pub fn for_mode(mode: EncodingMode, fingerprint: &str) -> Self {
        match mode {
            EncodingMode::Plain => Self::plain(),
            EncodingMode::Obscured => Self::obscured(fingerprint),
        }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    pub fn encode(&self, session: &Session) -> Result<String, AttemptError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AttemptError::malformed(SESSION_KEY, e.to_string()))?;
        Ok(match self.mode {
            EncodingMode::Plain => json,
            EncodingMode::Obscured => STANDARD.encode(self.xor(json.as_bytes())),
        })
    }

    pub fn decode(&self, raw: &str) -> Result<Session, AttemptError> {
        let json = match self.mode {
            EncodingMode::Plain => raw.to_string(),
            EncodingMode::Obscured => {
                let bytes = STANDARD
                    .decode(raw.trim())
                    .map_err(|e| AttemptError::malformed(SESSION_KEY, format!("base64: {}", e)))?;
                String::from_utf8(self.xor(&bytes))
                    .map_err(|_| AttemptError::malformed(SESSION_KEY, "not UTF-8 after unmasking"))?
            }
        };
        serde_json::from_str(&json).map_err(|e| AttemptError::malformed(SESSION_KEY, e.to_string()))
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn session() -> Session {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Session::issue("admin@ngo.org", now, Duration::hours(2))
    }

    #[test]
    fn test_plain_is_readable_json() {
        let codec = SessionCodec::plain();
        let encoded = codec.encode(&session()).unwrap();
        assert!(encoded.starts_with('{'));
        assert!(encoded.contains("admin@ngo.org"));
    }

    #[test]
    fn test_obscured_hides_text_and_decodes() {
        let codec = SessionCodec::obscured("Mozilla/5.0en-US1920x1080");
        let original = session();
        let encoded = codec.encode(&original).unwrap();

        assert!(!encoded.contains("admin@ngo.org"));
        assert!(!encoded.starts_with('{'));
        assert_eq!(codec.decode(&encoded).unwrap(), original);
    }

    #[test]
    fn test_obscured_with_other_fingerprint_is_malformed() {
        let encoded = SessionCodec::obscured("host-a").encode(&session()).unwrap();
        let result = SessionCodec::obscured("host-b").decode(&encoded);
        assert!(matches!(
            result,
            Err(AttemptError::MalformedStoredState { key: SESSION_KEY, .. })
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(SessionCodec::plain().decode("{not json").is_err());
        assert!(SessionCodec::obscured("host").decode("%%%").is_err());
    }

    #[test]
    fn test_empty_fingerprint_still_obscures() {
        let codec = SessionCodec::obscured("");
        let encoded = codec.encode(&session()).unwrap();
        assert!(!encoded.contains("admin@ngo.org"));
    }
}
