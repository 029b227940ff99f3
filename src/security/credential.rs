// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The administrator credential.
//!
//! The site has exactly one admin account, fixed at build time. The secret
//! is stored as lower-case hex SHA-256, unsalted, because the hash ships in
//! the site's assets anyway; it deters casual reading and nothing more.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Identifier of the built-in admin account.
pub const DEFAULT_ADMIN_IDENTIFIER: &str = "admin@ngo.org";

/// SHA-256 (hex) of the built-in admin secret.
pub const DEFAULT_ADMIN_SECRET_HASH: &str =
    "a665a45920422f9d417e4867efdc4fb8a04a1f3fff1fa07e998e86f7f7a27ae3";

/// The built-in admin credential.
pub const DEFAULT_CREDENTIAL: Credential = Credential {
    identifier: DEFAULT_ADMIN_IDENTIFIER,
    secret_hash: DEFAULT_ADMIN_SECRET_HASH,
};

/// A compile-time credential: identifier plus hex SHA-256 of the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub identifier: &'static str,
    pub secret_hash: &'static str,
}

impl Credential {
    pub const fn new(identifier: &'static str, secret_hash: &'static str) -> Self {
        Self {
            identifier,
            secret_hash,
        }
    }

    /// True when both the identifier and the secret match.
    ///
    /// The hash comparison is constant-time; the identifier comparison is
    /// not, since the identifier is public.
    pub fn matches(&self, identifier: &str, secret: &str) -> bool {
        let hashed = hash_secret(secret);
        let hash_matches: bool = hashed
            .as_bytes()
            .ct_eq(self.secret_hash.to_ascii_lowercase().as_bytes())
            .into();
        // Evaluate the hash first so a wrong identifier costs the same work.
        hash_matches && identifier == self.identifier
    }
}

impl Default for Credential {
    fn default() -> Self {
        DEFAULT_CREDENTIAL
    }
}

/// Lower-case hex SHA-256 of `secret`'s UTF-8 bytes.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_secret_known_vector() {
        assert_eq!(
            hash_secret("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_default_credential_matches_its_secret() {
        assert!(DEFAULT_CREDENTIAL.matches("admin@ngo.org", "123"));
        assert!(!DEFAULT_CREDENTIAL.matches("admin@ngo.org", "1234"));
        assert!(!DEFAULT_CREDENTIAL.matches("someone@ngo.org", "123"));
    }

    #[test]
    fn test_upper_case_stored_hash_still_matches() {
        const UPPER: Credential = Credential::new(
            "editor@ngo.org",
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD",
        );
        assert!(UPPER.matches("editor@ngo.org", "abc"));
    }
}
