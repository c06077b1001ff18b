// Text helpers shared by selection, validation, and classification.

use regex::Regex;
use std::sync::LazyLock;

static YEAR_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_\s]+(19|20)\d{2}$").expect("valid regex"));

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Derive a lowercase show-title phrase from a show id.
///
/// Strips a trailing year suffix and turns separators into spaces:
/// `"the-book-of-mormon-2011"` becomes `"the book of mormon"`.
pub fn show_title(show_id: &str) -> String {
    let trimmed = show_id.trim();
    let without_year = YEAR_SUFFIX_RE.replace(trimmed, "");
    without_year
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Title words long enough to be meaningful evidence of relevance (more than 3 characters).
pub fn significant_title_words(title: &str) -> Vec<&str> {
    title
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect()
}
