use curtaincall_model::FailureLedger;

use crate::store::StoredRecord;

/// Options that shape one run's worklist.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub min_words: usize,
    /// Maximum worklist length (0 = unlimited).
    pub limit: usize,
    pub show: Option<&'a str>,
}

/// Pick the records that still need text, in store order.
///
/// A record qualifies when it has a source URL, lacks full text (or its
/// text is under `min_words`), and has not hit the ledger's retry cap.
/// Capped records are skipped silently until their entry is reset.
pub fn select_work(records: Vec<StoredRecord>, ledger: &FailureLedger, opts: &Selection<'_>) -> Vec<StoredRecord> {
    let mut capped = 0usize;
    let mut worklist: Vec<StoredRecord> = records
        .into_iter()
        .filter(|s| opts.show.map_or(true, |show| s.record.show_id == show))
        .filter(|s| s.record.source_url().is_some())
        .filter(|s| s.record.needs_text(opts.min_words))
        .filter(|s| {
            let allowed = ledger.allows_retry(&s.locator);
            if !allowed {
                capped += 1;
            }
            allowed
        })
        .collect();

    if opts.limit > 0 {
        worklist.truncate(opts.limit);
    }
    tracing::debug!(selected = worklist.len(), capped, "Selected worklist");
    worklist
}
