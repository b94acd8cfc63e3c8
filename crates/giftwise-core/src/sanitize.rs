//! Text sanitization shared by every consumer of model output.
//!
//! Model output frequently arrives wrapped in markdown code fences
//! (```` ```json ... ``` ````). Everything that reads model text goes
//! through [`strip_fences`] so there is one definition of "clean text".

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Code fence marker with an optional lowercase language tag.
    pub static ref FENCE_PATTERN: Regex = Regex::new(r"```[a-z]*").unwrap();

    /// Numbered list marker such as `1.` or `12.`.
    pub static ref LIST_MARKER_PATTERN: Regex = Regex::new(r"\d+\.").unwrap();
}

/// Remove all code fence markers and trim surrounding whitespace.
pub fn strip_fences(text: &str) -> String {
    FENCE_PATTERN.replace_all(text, "").trim().to_string()
}

/// Clean a single field value, returning `None` when nothing is left.
pub fn clean_field(value: &str) -> Option<String> {
    let cleaned = strip_fences(value);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Check whether text contains any of the given keywords, ignoring case.
///
/// Keywords are expected in lowercase.
pub fn contains_keyword(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}
