//! Search-key matching over display names.

use std::sync::LazyLock;

use regex::Regex;

/// Punctuation, separators and whitespace are ignored on both sides.
static IGNORED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\p{P}\p{Z}\s]+").ok());

/// Lowercased `text` with ignored characters stripped.
pub fn normalize(text: &str) -> String {
    let stripped = match IGNORED.as_ref() {
        Some(re) => re.replace_all(text, ""),
        None => text.into(),
    };
    stripped.to_lowercase()
}

/// Prepared search key.
#[derive(Debug, Clone)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(key: &str) -> Self {
        NameFilter {
            needle: normalize(key),
        }
    }

    /// Substring match anywhere in the normalized name.
    pub fn matches(&self, name: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        match IGNORED.as_ref() {
            Some(re) => contains_lowercase(&re.replace_all(name, ""), &self.needle),
            None => contains_lowercase(name, &self.needle),
        }
    }
}

/// Case-insensitive substring match with an ASCII fast path.
///
/// `needle_lower` must already be lowercased.
fn contains_lowercase(haystack: &str, needle_lower: &str) -> bool {
    if haystack.is_ascii() {
        let h = haystack.as_bytes();
        let n = needle_lower.as_bytes();
        if n.len() > h.len() {
            return false;
        }
        h.windows(n.len())
            .any(|w| w.iter().zip(n).all(|(a, b)| a.to_ascii_lowercase() == *b))
    } else {
        haystack.to_lowercase().contains(needle_lower)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
