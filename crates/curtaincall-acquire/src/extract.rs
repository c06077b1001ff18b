// Heuristic article-body extraction from fetched markup.
//
// Pure function of the raw content; whether the result is usable is decided
// by validation, not here.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::normalize;

/// Article containers, most specific first.
const CONTAINER_SELECTORS: &[&str] = &[
    r#"[itemprop="articleBody"]"#,
    ".article-body",
    ".article__body",
    ".article-content",
    ".story-body",
    ".review-body",
    ".entry-content",
    ".post-content",
    "article",
    ".content",
    "main",
];

/// Paragraph-level elements inside a container must exceed this many characters.
const CONTAINER_PARAGRAPH_MIN_CHARS: usize = 30;
/// Below this length the container result is considered weak and the page-wide scan runs.
const STRONG_CANDIDATE_CHARS: usize = 1000;
/// Paragraphs picked up by the page-wide scan must exceed this many characters.
const FALLBACK_PARAGRAPH_MIN_CHARS: usize = 50;

/// Lowercase markers of page furniture that is never article prose.
const BOILERPLATE_MARKERS: &[&str] = &[
    "cookie",
    "subscribe",
    "sign up",
    "sign in",
    "newsletter",
    "advertisement",
    "all rights reserved",
    "privacy policy",
];

static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTAINER_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

/// Extract the best-effort plain-text article body from raw HTML.
///
/// Tries each container selector, joining the container's paragraphs that
/// exceed 30 characters with blank lines, and keeps the longest candidate.
/// If nothing reaches 1000 characters, scans every paragraph on the page
/// (over 50 characters, no boilerplate markers) and uses that if longer.
/// Returns an empty string when nothing qualifies.
pub fn extract_article_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut best = String::new();

    for (selector, source) in CONTAINERS.iter().zip(CONTAINER_SELECTORS) {
        for container in document.select(selector) {
            let candidate = join_paragraphs(container, CONTAINER_PARAGRAPH_MIN_CHARS, false);
            if char_len(&candidate) > char_len(&best) {
                tracing::trace!(selector = source, chars = char_len(&candidate), "New best container");
                best = candidate;
            }
        }
    }

    if char_len(&best) < STRONG_CANDIDATE_CHARS {
        let fallback = join_paragraphs(document.root_element(), FALLBACK_PARAGRAPH_MIN_CHARS, true);
        if char_len(&fallback) > char_len(&best) {
            tracing::trace!(chars = char_len(&fallback), "Using page-wide paragraph scan");
            best = fallback;
        }
    }

    normalize::normalize_text(&best)
}

fn join_paragraphs(scope: ElementRef<'_>, min_chars: usize, skip_boilerplate: bool) -> String {
    scope
        .select(&PARAGRAPHS)
        .map(element_text)
        .filter(|text| char_len(text) > min_chars)
        .filter(|text| !skip_boilerplate || !is_boilerplate(text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Paragraph text with source line breaks and indentation folded to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_boilerplate(text: &str) -> bool {
    let lower = text.to_lowercase();
    BOILERPLATE_MARKERS.iter().any(|m| lower.contains(m))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
