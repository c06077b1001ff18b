// Quality tier assignment for accepted review text.
//
// Rules are evaluated in order and the first match wins:
// full, then partial, then excerpt. Empty or whitespace-only text is
// classified `missing` before any length rule is considered.

use curtaincall_model::{text, QualityTier};

/// Bodies longer than this many characters are candidates for `full`.
pub const FULL_MIN_CHARS: usize = 1500;
/// Bodies shorter than this many characters are `excerpt`.
pub const PARTIAL_MIN_CHARS: usize = 500;
/// Word count a `full` body must exceed.
pub const FULL_MIN_WORDS: usize = 300;

/// Classify accepted text for a show.
///
/// `show_title` is the normalized phrase from [`text::show_title`]; presence
/// is a case-insensitive substring test.
pub fn classify(body: &str, show_title: &str) -> QualityTier {
    if body.trim().is_empty() {
        return QualityTier::Missing;
    }
    let title_present = !show_title.is_empty()
        && body.to_lowercase().contains(&show_title.to_lowercase());
    classify_parts(body.chars().count(), title_present, text::word_count(body))
}

/// Tier as a pure function of (character length, title presence, word count).
pub fn classify_parts(chars: usize, title_present: bool, words: usize) -> QualityTier {
    if chars == 0 {
        return QualityTier::Missing;
    }
    if chars > FULL_MIN_CHARS && title_present && words > FULL_MIN_WORDS {
        return QualityTier::Full;
    }
    let mid_length = (PARTIAL_MIN_CHARS..=FULL_MIN_CHARS).contains(&chars);
    let titled_but_thin = title_present && words <= FULL_MIN_WORDS && chars >= PARTIAL_MIN_CHARS;
    let long_but_weak = chars > FULL_MIN_CHARS && (!title_present || words <= FULL_MIN_WORDS);
    if mid_length || titled_but_thin || long_but_weak {
        return QualityTier::Partial;
    }
    QualityTier::Excerpt
}
