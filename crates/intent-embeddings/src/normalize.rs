//! Text normalization applied before encoding.
//!
//! The default rule lowercases, composes to NFC, replaces every character
//! outside the allowed alphabet with a space, collapses whitespace runs and
//! trims. The allowed alphabet is ASCII digits, `a-z`, the Vietnamese
//! accented vowels, `đ` and whitespace.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Normalizer capability: `None` means "nothing left to classify".
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Option<String>;
}

const DISALLOWED_PATTERN: &str = concat!(
    "[^0-9a-z",
    "àáạảãâầấậẩẫăằắặẳẵ",
    "èéẹẻẽêềếệểễ",
    "ìíịỉĩ",
    "òóọỏõôồốộổỗơờớợởỡ",
    "ùúụủũưừứựửữ",
    "ỳýỵỷỹ",
    "đ",
    r"\s]",
);

/// Vietnamese + Latin normalizer.
#[derive(Debug, Clone)]
pub struct DefaultNormalizer {
    disallowed: Regex,
    whitespace: Regex,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        // Both patterns are literals.
        Self {
            disallowed: Regex::new(DISALLOWED_PATTERN).expect("valid character class"),
            whitespace: Regex::new(r"\s+").expect("valid whitespace pattern"),
        }
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer for DefaultNormalizer {
    fn normalize(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        let lowered: String = text.to_lowercase().nfc().collect();
        let replaced = self.disallowed.replace_all(&lowered, " ");
        let collapsed = self.whitespace.replace_all(&replaced, " ");
        let trimmed = collapsed.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> Option<String> {
        DefaultNormalizer::new().normalize(text)
    }

    #[test]
    fn test_lowercase_and_punctuation() {
        assert_eq!(norm("Book a Flight!!").as_deref(), Some("book a flight"));
        assert_eq!(norm("what's the weather?").as_deref(), Some("what s the weather"));
    }

    #[test]
    fn test_keeps_vietnamese_letters() {
        assert_eq!(
            norm("Đặt vé máy bay").as_deref(),
            Some("đặt vé máy bay")
        );
    }

    #[test]
    fn test_composes_decomposed_input() {
        // "é" as e + combining acute
        assert_eq!(norm("Cafe\u{0301}").as_deref(), Some("café"));
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(norm("  cancel \t\n my   order ").as_deref(), Some("cancel my order"));
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(norm(""), None);
        assert_eq!(norm("   "), None);
        assert_eq!(norm("?!..,;"), None);
    }

    #[test]
    fn test_other_scripts_removed() {
        assert_eq!(norm("привет hello").as_deref(), Some("hello"));
    }
}
