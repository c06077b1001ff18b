// Collection status for the `status` command.

use curtaincall_model::{FailureLedger, QualityTier};
use std::collections::BTreeMap;

use crate::store::StoredRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowStatus {
    pub total: usize,
    pub complete: usize,
    /// Has a URL, still needs text, and may be retried.
    pub pending: usize,
    pub missing_url: usize,
    /// Hit the retry cap and awaits a manual reset.
    pub capped: usize,
    pub tiers: BTreeMap<QualityTier, usize>,
}

/// Tally records per show, in show-id order.
pub fn collection_status(
    records: &[StoredRecord],
    ledger: &FailureLedger,
    min_words: usize,
) -> BTreeMap<String, ShowStatus> {
    let mut shows: BTreeMap<String, ShowStatus> = BTreeMap::new();

    for stored in records {
        let record = &stored.record;
        let status = shows.entry(record.show_id.clone()).or_default();
        status.total += 1;

        if !record.needs_text(min_words) {
            status.complete += 1;
        } else if record.source_url().is_none() {
            status.missing_url += 1;
        } else if !ledger.allows_retry(&stored.locator) {
            status.capped += 1;
        } else {
            status.pending += 1;
        }

        if let Some(tier) = record.text_quality {
            *status.tiers.entry(tier).or_default() += 1;
        }
    }

    shows
}
