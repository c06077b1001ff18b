// Durable memory of records whose text could not be acquired.
//
// Only the latest attempt's per-method reasons are kept, but the attempt
// count carries across runs and gates automatic retries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::FetchMethod;

/// Attempts after which a record is no longer retried automatically.
pub const RETRY_CAP: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FailureLedger {
    pub entries: Vec<FailureLedgerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailureLedgerEntry {
    /// Stable locator of the record (its file path relative to the data directory).
    pub file_path: String,
    pub url: String,
    pub attempts: u32,
    pub first_attempt: DateTime<Utc>,
    pub last_attempt: DateTime<Utc>,
    /// Per-method reasons from the most recent attempt, in chain order.
    pub errors: Vec<MethodFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodFailure {
    pub method: FetchMethod,
    pub error: String,
}

impl FailureLedgerEntry {
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= RETRY_CAP
    }
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, locator: &str) -> Option<&FailureLedgerEntry> {
        self.entries.iter().find(|e| e.file_path == locator)
    }

    /// Attempts recorded so far for a locator (0 when never failed).
    pub fn attempts(&self, locator: &str) -> u32 {
        self.get(locator).map(|e| e.attempts).unwrap_or(0)
    }

    /// Whether a locator may still be retried automatically.
    pub fn allows_retry(&self, locator: &str) -> bool {
        self.attempts(locator) < RETRY_CAP
    }

    /// Record a full-chain failure: find-or-create the entry, bump the count,
    /// and replace the stored reasons with this attempt's. Returns the new count.
    pub fn record_failure(
        &mut self,
        locator: &str,
        url: &str,
        errors: Vec<MethodFailure>,
        at: DateTime<Utc>,
    ) -> u32 {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.file_path == locator) {
            entry.attempts = entry.attempts.saturating_add(1);
            entry.last_attempt = at;
            entry.url = url.to_string();
            entry.errors = errors;
            return entry.attempts;
        }

        self.entries.push(FailureLedgerEntry {
            file_path: locator.to_string(),
            url: url.to_string(),
            attempts: 1,
            first_attempt: at,
            last_attempt: at,
            errors,
        });
        1
    }

    /// Drop the entry for a locator, e.g. after the record finally succeeded.
    pub fn clear(&mut self, locator: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.file_path != locator);
        before != self.entries.len()
    }

    /// Drop every entry matching the predicate, returning how many were removed.
    pub fn reset_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&FailureLedgerEntry) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(e));
        before - self.entries.len()
    }

    pub fn exhausted(&self) -> impl Iterator<Item = &FailureLedgerEntry> {
        self.entries.iter().filter(|e| e.is_exhausted())
    }
}
