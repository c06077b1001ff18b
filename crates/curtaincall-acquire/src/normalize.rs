use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static HORIZONTAL_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));

/// Normalize extracted article text.
///
/// NFC-normalizes, collapses runs of spaces/tabs (including non-breaking
/// spaces) to one space, trims each line, collapses consecutive blank
/// lines to a single blank line, and trims the whole body.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.replace("\r\n", "\n").replace('\r', "\n").nfc().collect();
    let spaced = HORIZONTAL_WS_RE.replace_all(&nfc, " ");

    let trimmed = spaced
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    collapse_blank_lines(&trimmed).trim().to_string()
}

/// Collapse multiple consecutive blank lines into a single blank line.
pub fn collapse_blank_lines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_blank = false;

    for line in input.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && prev_blank {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(line);
        prev_blank = is_blank;
    }

    result
}
