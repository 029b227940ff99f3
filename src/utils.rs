// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Small formatting helpers shared by the library and the shell.

/// Mask a token (session id, CSRF token) for logging.
///
/// Shows only the first `visible_prefix` characters followed by "...".
///
/// # Examples
///
/// ```
/// use siteguard::utils::mask_sensitive;
///
/// let masked = mask_sensitive("sess_0f1e2d3c4b5a69788796a5b4c3d2e1f0", 9);
/// assert_eq!(masked, "sess_0f1e...");
/// ```
pub fn mask_sensitive(input: &str, visible_prefix: usize) -> String {
    if input.len() <= visible_prefix {
        return format!("{}...", input);
    }

    let prefix: String = input.chars().take(visible_prefix).collect();
    format!("{}...", prefix)
}

/// Byte count as megabytes with two decimals, e.g. `"1.50 MB"`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Whole seconds as `"14m 05s"` or `"45s"`.
pub fn format_wait(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_sensitive() {
        assert_eq!(mask_sensitive("csrf_abcdef", 5), "csrf_...");
        assert_eq!(mask_sensitive("short", 8), "short...");
        assert_eq!(mask_sensitive("", 8), "...");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00 MB");
        assert_eq!(format_megabytes(1024 * 1024 * 3 / 2), "1.50 MB");
    }

    #[test]
    fn test_format_wait() {
        assert_eq!(format_wait(45), "45s");
        assert_eq!(format_wait(845), "14m 05s");
    }
}
