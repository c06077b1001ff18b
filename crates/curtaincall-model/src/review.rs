use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text;

/// One citation of a published critique of a production.
///
/// Records are created by aggregator-import tooling with at least a show id,
/// an outlet, and a source URL. Acquisition only ever adds the text fields;
/// it never deletes a record. Keys written by other tooling that this type
/// does not model are carried in `extra` so a rewrite preserves them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub show_id: String,
    pub outlet_id: String,
    /// Display name of the outlet (e.g., "The New York Times").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
    #[serde(default)]
    pub critic_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Short quotes already collected from review aggregators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excerpts: Vec<Excerpt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub text_status: TextStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_fetched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_method: Option<FetchMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_quality: Option<QualityTier>,
    /// Archive file holding the raw capture, relative to the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A short quote attributed to a named aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Excerpt {
    pub aggregator: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextStatus {
    #[default]
    Pending,
    Complete,
}

/// The retrieval strategy that produced a record's text, in chain priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    /// Automated browser session with humanized behaviour.
    Direct,
    /// Managed scraping proxy.
    Proxy,
    /// Historical snapshot from a web archive.
    Snapshot,
}

impl FetchMethod {
    pub const ALL: [FetchMethod; 3] = [FetchMethod::Direct, FetchMethod::Proxy, FetchMethod::Snapshot];

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Direct => "direct",
            FetchMethod::Proxy => "proxy",
            FetchMethod::Snapshot => "snapshot",
        }
    }
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of how much usable article text was recovered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Full,
    Partial,
    Excerpt,
    Missing,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Full,
        QualityTier::Partial,
        QualityTier::Excerpt,
        QualityTier::Missing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Full => "full",
            QualityTier::Partial => "partial",
            QualityTier::Excerpt => "excerpt",
            QualityTier::Missing => "missing",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a successful acquisition adds to a record.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    pub text: String,
    pub word_count: usize,
    pub method: FetchMethod,
    pub quality: QualityTier,
    pub fetched_at: DateTime<Utc>,
    pub archive_path: String,
}

impl ReviewRecord {
    /// Minimal record as produced by the import tooling.
    pub fn new(show_id: &str, outlet_id: &str, critic_name: Option<&str>, url: Option<&str>) -> Self {
        Self {
            show_id: show_id.to_string(),
            outlet_id: outlet_id.to_string(),
            outlet: None,
            critic_name: critic_name.map(String::from),
            url: url.map(String::from),
            excerpts: Vec::new(),
            full_text: None,
            word_count: None,
            text_status: TextStatus::Pending,
            text_fetched_at: None,
            fetch_method: None,
            text_quality: None,
            archive_path: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The source URL, if present and non-blank.
    pub fn source_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Word count of the stored full text, preferring the recorded count.
    pub fn full_text_words(&self) -> usize {
        match (&self.full_text, self.word_count) {
            (Some(_), Some(count)) => count,
            (Some(text), None) => text::word_count(text),
            (None, _) => 0,
        }
    }

    /// Whether the record still lacks usable full text.
    pub fn needs_text(&self, min_words: usize) -> bool {
        self.full_text.is_none() || self.full_text_words() < min_words
    }

    /// Human-readable show title derived from the show id.
    pub fn show_title(&self) -> String {
        text::show_title(&self.show_id)
    }

    pub fn critic_or_unknown(&self) -> &str {
        self.critic_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("unknown")
    }

    /// Apply a successful acquisition.
    pub fn apply_acquisition(&mut self, acquired: AcquiredText) {
        self.full_text = Some(acquired.text);
        self.word_count = Some(acquired.word_count);
        self.text_status = TextStatus::Complete;
        self.text_fetched_at = Some(acquired.fetched_at);
        self.fetch_method = Some(acquired.method);
        self.text_quality = Some(acquired.quality);
        self.archive_path = Some(acquired.archive_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "showId": "hamilton-2015",
            "outletId": "nytimes",
            "criticName": "Ben Brantley",
            "url": "https://example.com/review",
            "excerpts": [{"aggregator": "dtli", "text": "A triumph."}],
            "assignedScore": 92
        }"#;
        let record: ReviewRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.show_id, "hamilton-2015");
        assert_eq!(record.text_status, TextStatus::Pending);
        assert_eq!(record.excerpts.len(), 1);
        assert_eq!(record.extra.get("assignedScore"), Some(&serde_json::json!(92)));
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let json = r#"{"showId":"wicked-2003","outletId":"variety","criticName":null,"url":null,"originalRating":"B+"}"#;
        let record: ReviewRecord = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["originalRating"], "B+");
        assert_eq!(out["textStatus"], "pending");
    }

    #[test]
    fn test_needs_text() {
        let mut record = ReviewRecord::new("cats-1982", "nyt", None, Some("https://x"));
        assert!(record.needs_text(300));

        record.full_text = Some("short text".into());
        assert!(record.needs_text(300));

        record.full_text = Some("word ".repeat(300));
        assert!(!record.needs_text(300));

        // A recorded count wins over recounting
        record.word_count = Some(12);
        assert!(record.needs_text(300));
    }

    #[test]
    fn test_source_url_blank() {
        let record = ReviewRecord::new("cats-1982", "nyt", None, Some("   "));
        assert_eq!(record.source_url(), None);
    }

    #[test]
    fn test_apply_acquisition() {
        let mut record = ReviewRecord::new("cats-1982", "nyt", Some("Frank Rich"), Some("https://x"));
        record.apply_acquisition(AcquiredText {
            text: "text".into(),
            word_count: 1,
            method: FetchMethod::Snapshot,
            quality: QualityTier::Excerpt,
            fetched_at: Utc::now(),
            archive_path: "archives/cats-1982/nyt--frank-rich--2026-01-01.html".into(),
        });
        assert_eq!(record.text_status, TextStatus::Complete);
        assert_eq!(record.fetch_method, Some(FetchMethod::Snapshot));
        assert_eq!(record.text_quality, Some(QualityTier::Excerpt));
        assert_eq!(record.critic_or_unknown(), "Frank Rich");
    }
}
