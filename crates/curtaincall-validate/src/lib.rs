use curtaincall_model::text;
use thiserror::Error;

pub mod quality;

pub use quality::classify;

/// Default minimum number of words a body must contain to be accepted.
pub const DEFAULT_MIN_WORDS: usize = 300;

/// Why a candidate body was not accepted for a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("too short ({words} words, need {min})")]
    TooShort { words: usize, min: usize },

    #[error("show title not found ({title:?})")]
    TitleNotFound { title: String },
}

/// An accepted candidate, with the counts later stages need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub word_count: usize,
}

/// Accept or reject one candidate body for a show.
///
/// Word count is checked first, so a short body is rejected regardless of
/// relevance. Relevance requires at least one significant word of the
/// show title (more than 3 characters) to appear anywhere in the text,
/// compared case-insensitively. Titles made only of short words fall back
/// to checking every title word.
pub fn validate_candidate(text: &str, show_id: &str, min_words: usize) -> Result<Accepted, Rejection> {
    let words = text::word_count(text);
    if words < min_words {
        return Err(Rejection::TooShort { words, min: min_words });
    }

    let title = text::show_title(show_id);
    if !mentions_title(text, &title) {
        return Err(Rejection::TitleNotFound { title });
    }

    Ok(Accepted { word_count: words })
}

fn mentions_title(text: &str, title: &str) -> bool {
    let haystack = text.to_lowercase();
    let significant = text::significant_title_words(title);
    let words: Vec<&str> = if significant.is_empty() {
        title.split_whitespace().collect()
    } else {
        significant
    };

    if words.is_empty() {
        tracing::debug!(title, "Empty show title; skipping relevance check");
        return true;
    }
    words.iter().any(|w| haystack.contains(w))
}
