// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Password strength scoring for choosing a new admin secret.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Minimum length that earns the length point.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Score needed (out of 5) for a password to be accepted.
pub const MIN_ACCEPTED_SCORE: u8 = 4;

// JUSTIFICATION for .expect(): literal pattern, exercised by the tests below.
static SPECIAL_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("special character regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// Number of satisfied rules, 0..=5
    pub score: u8,
    pub is_valid: bool,
    /// Unmet rules, phrased as what is still missing
    pub feedback: Vec<&'static str>,
}

/// Score `password` against the five rules: length, upper case, lower case,
/// digit, special character.
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks = [
        (
            password.chars().count() >= MIN_PASSWORD_LENGTH,
            "At least 8 characters",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "One uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "One lowercase letter",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "One number"),
        (SPECIAL_CHAR.is_match(password), "One special character"),
    ];

    let score = checks.iter().filter(|(ok, _)| *ok).count() as u8;
    let feedback = checks
        .iter()
        .filter(|(ok, _)| !*ok)
        .map(|(_, hint)| *hint)
        .collect();

    PasswordStrength {
        score,
        is_valid: score >= MIN_ACCEPTED_SCORE,
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password() {
        let strength = password_strength("AdminSecure123!");
        assert_eq!(strength.score, 5);
        assert!(strength.is_valid);
        assert!(strength.feedback.is_empty());
    }

    #[test]
    fn test_four_of_five_is_enough() {
        let strength = password_strength("adminsecure123!");
        assert_eq!(strength.score, 4);
        assert!(strength.is_valid);
        assert_eq!(strength.feedback, vec!["One uppercase letter"]);
    }

    #[test]
    fn test_weak_password_feedback() {
        let strength = password_strength("123");
        assert_eq!(strength.score, 1);
        assert!(!strength.is_valid);
        assert_eq!(
            strength.feedback,
            vec![
                "At least 8 characters",
                "One uppercase letter",
                "One lowercase letter",
                "One special character",
            ]
        );
    }

    #[test]
    fn test_special_characters_outside_set_do_not_count() {
        let strength = password_strength("Abcdefg1~");
        assert!(strength.feedback.contains(&"One special character"));
    }
}
