//! Marker scanning over free-text note content
//!
//! Kept free of persistence so it can be tested (and fuzzed) standalone.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Marker prefix embedded in note content, e.g. `@note:abc123`
pub const MARKER_PREFIX: &str = "@note:";

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@note:([A-Za-z0-9_-]+)").expect("marker regex is valid"))
}

/// Extract distinct citation marker tokens from content, in first-occurrence
/// order. Repeated markers for the same token are collapsed; one label per
/// distinct referenced note.
pub fn scan_markers(content: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for capture in marker_pattern().captures_iter(content) {
        let token = &capture[1];
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }

    tokens
}

/// Strip the marker prefix from a token, if present
pub fn strip_marker_prefix(token: &str) -> &str {
    token.strip_prefix(MARKER_PREFIX).unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_empty_content() {
        assert!(scan_markers("").is_empty());
        assert!(scan_markers("no markers here").is_empty());
    }

    #[test]
    fn test_scan_single_marker() {
        assert_eq!(scan_markers("See @note:abc123."), vec!["abc123"]);
    }

    #[test]
    fn test_scan_deduplicates_in_first_occurrence_order() {
        let content = "See @note:pub123 and @note:other, then @note:pub123 again.";
        assert_eq!(scan_markers(content), vec!["pub123", "other"]);
    }

    #[test]
    fn test_scan_token_charset() {
        let content = "@note:a_b-C9 and @note:x.y";
        // '.' terminates the token
        assert_eq!(scan_markers(content), vec!["a_b-C9", "x"]);
    }

    #[test]
    fn test_scan_ignores_bare_prefix() {
        assert!(scan_markers("@note: nothing").is_empty());
    }

    #[test]
    fn test_strip_marker_prefix() {
        assert_eq!(strip_marker_prefix("@note:abc"), "abc");
        assert_eq!(strip_marker_prefix("abc"), "abc");
    }
}
