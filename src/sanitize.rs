//! Clean-up of raw model output into a single translated string.

use regex::Regex;
use std::sync::OnceLock;

/// Result of sanitizing a raw response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// The response yielded usable text
    Text(String),
    /// Nothing usable was left; carries the original source text
    Fallback(String),
}

impl Sanitized {
    pub fn into_text(self) -> String {
        match self {
            Sanitized::Text(text) | Sanitized::Fallback(text) => text,
        }
    }
}

/// One leading and one trailing quote, single or double
fn surrounding_quotes() -> &'static Regex {
    static QUOTES: OnceLock<Regex> = OnceLock::new();
    QUOTES.get_or_init(|| Regex::new(r#"^["']|["']$"#).expect("quote pattern is valid"))
}

/// Normalize a raw model response.
///
/// Models like to wrap the answer in quotes and append notes on following
/// lines, so only the first line is kept and one quote is stripped from each
/// end. An empty or absent response falls back to `source_text`.
pub fn sanitize_response(raw: Option<&str>, source_text: &str) -> Sanitized {
    let Some(raw) = raw else {
        return Sanitized::Fallback(source_text.to_string());
    };

    let first_line = raw
        .trim()
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned = surrounding_quotes().replace_all(first_line, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        Sanitized::Fallback(source_text.to_string())
    } else {
        Sanitized::Text(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clean(raw: &str) -> String {
        sanitize_response(Some(raw), "SOURCE").into_text()
    }

    #[test]
    fn test_quoted_answer_with_trailing_note() {
        assert_eq!(
            sanitize_response(Some("\"Bonjour\"\nNote: formal tone"), "Hello"),
            Sanitized::Text("Bonjour".to_string())
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean("  hola  "), "hola");
    }

    #[test]
    fn test_empty_response_falls_back() {
        assert_eq!(
            sanitize_response(Some(""), "Hello"),
            Sanitized::Fallback("Hello".to_string())
        );
        assert_eq!(
            sanitize_response(Some("   \n  "), "Hello"),
            Sanitized::Fallback("Hello".to_string())
        );
    }

    #[test]
    fn test_missing_response_falls_back() {
        assert_eq!(
            sanitize_response(None, "Hello"),
            Sanitized::Fallback("Hello".to_string())
        );
    }

    #[test]
    fn test_single_quotes_stripped() {
        assert_eq!(clean("'नमस्ते'"), "नमस्ते");
    }

    #[test]
    fn test_only_one_quote_per_side() {
        assert_eq!(clean("\"\"quoted\"\""), "\"quoted\"");
    }

    #[test]
    fn test_inner_quotes_kept() {
        assert_eq!(clean("il a dit \"oui\" hier"), "il a dit \"oui\" hier");
    }

    #[test]
    fn test_crlf_line_break() {
        assert_eq!(clean("வணக்கம்\r\nExplanation"), "வணக்கம்");
    }

    #[test]
    fn test_lone_quote_falls_back() {
        assert_eq!(
            sanitize_response(Some("\""), "Hello"),
            Sanitized::Fallback("Hello".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_never_multiline(raw in ".*", source in "[a-z]{1,10}") {
            let out = sanitize_response(Some(&raw), &source).into_text();
            prop_assert!(!out.contains('\n'));
            prop_assert!(!out.contains('\r'));
        }

        #[test]
        fn prop_never_empty_for_nonempty_source(raw in ".*", source in "[a-z]{1,10}") {
            let out = sanitize_response(Some(&raw), &source).into_text();
            prop_assert!(!out.is_empty());
        }

        #[test]
        fn prop_plain_words_pass_through(word in "[a-zA-Z]{1,20}") {
            prop_assert_eq!(clean(&word), word);
        }
    }
}
