//! Input validation shared by the task handlers.
//!
//! User text is stripped of HTML-like markup before any check or prompt
//! composition, then checked for emptiness and length. Lengths are counted
//! in characters, not bytes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::AppError;

pub const MAX_ANALYZE_CHARS: usize = 2500;
pub const MAX_SITUATION_CHARS: usize = 5000;

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r"<[^>]*>?").expect("valid markup regex");
}

/// Removes tags such as `<script>` or `<b>`, including an unterminated trailing `<...`.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

/// Rejects empty/whitespace-only text and text longer than `max_chars`.
pub fn require_text(field: &str, text: &str, max_chars: usize) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required.")));
    }

    let len = text.chars().count();
    if len > max_chars {
        return Err(AppError::Validation(format!(
            "{field} is too long ({len} characters, max {max_chars})."
        )));
    }

    Ok(())
}

/// Strips markup and trims, substituting `default` when nothing is left.
pub fn clean_or_default(value: Option<&str>, default: &str) -> String {
    let cleaned = value.map(strip_markup).unwrap_or_default();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_limit_is_accepted() {
        let text = "a".repeat(MAX_ANALYZE_CHARS);
        assert!(require_text("Text", &text, MAX_ANALYZE_CHARS).is_ok());
    }

    #[test]
    fn test_one_over_limit_is_rejected() {
        let text = "a".repeat(MAX_ANALYZE_CHARS + 1);
        let err = require_text("Text", &text, MAX_ANALYZE_CHARS).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("too long")));
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_ANALYZE_CHARS);
        assert!(text.len() > MAX_ANALYZE_CHARS);
        assert!(require_text("Text", &text, MAX_ANALYZE_CHARS).is_ok());
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        for text in ["", "   ", "\n\t "] {
            let err = require_text("Text", text, MAX_ANALYZE_CHARS).unwrap_err();
            assert!(matches!(err, AppError::Validation(msg) if msg == "Text is required."));
        }
    }

    #[test]
    fn test_strip_markup_removes_tags() {
        assert_eq!(
            strip_markup("hey <b>boss</b> <script>alert(1)</script>thx"),
            "hey boss alert(1)thx"
        );
        assert_eq!(strip_markup("trailing <img src=x"), "trailing ");
        assert_eq!(strip_markup("3 > 2"), "3 > 2");
    }

    #[test]
    fn test_markup_only_text_becomes_empty() {
        let cleaned = strip_markup("<p></p>");
        assert!(require_text("Text", &cleaned, MAX_ANALYZE_CHARS).is_err());
    }

    #[test]
    fn test_clean_or_default() {
        assert_eq!(clean_or_default(None, "Neutral"), "Neutral");
        assert_eq!(clean_or_default(Some("  "), "Neutral"), "Neutral");
        assert_eq!(clean_or_default(Some("<i>Boss</i>"), "General Audience"), "Boss");
    }
}
