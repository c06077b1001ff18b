// One acquisition pass over the work queue.
//
// idle -> selecting -> processing(record)... -> draining -> idle
//
// The worklist is a snapshot taken once at the start. Records are processed
// strictly one at a time; a record's failure never aborts the run. The
// ledger is flushed every `checkpoint_every` records and again on drain.

use anyhow::{Context, Result};
use chrono::Utc;
use curtaincall_model::{AcquiredText, FailureLedger, FetchMethod, QualityTier};
use curtaincall_validate::classify;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::archive::ArchiveWriter;
use crate::chain::{ChainOutcome, MethodChain, Retrieved};
use crate::config::RunConfig;
use crate::methods::{standard_methods, RetrievalMethod};
use crate::pacing::Pacer;
use crate::selector::{select_work, Selection};
use crate::store::{LedgerStore, ReviewStore, StoredRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Selecting,
    Processing { index: usize, total: usize },
    Draining,
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub selected: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub by_method: BTreeMap<FetchMethod, usize>,
    pub by_tier: BTreeMap<QualityTier, usize>,
    /// The run was asked to stop before the worklist was exhausted.
    pub stopped_early: bool,
}

impl RunSummary {
    /// Percentage of processed records that succeeded (0 when nothing ran).
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.succeeded as f64 * 100.0 / self.processed as f64
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} of {}, succeeded {}, failed {} ({:.1}% success)",
            self.processed,
            self.selected,
            self.succeeded,
            self.failed,
            self.success_rate()
        )?;
        if !self.by_method.is_empty() {
            let methods: Vec<String> = self.by_method.iter().map(|(m, n)| format!("{m}={n}")).collect();
            write!(f, "; methods: {}", methods.join(", "))?;
        }
        if !self.by_tier.is_empty() {
            let tiers: Vec<String> = self.by_tier.iter().map(|(t, n)| format!("{t}={n}")).collect();
            write!(f, "; tiers: {}", tiers.join(", "))?;
        }
        if self.stopped_early {
            write!(f, " [stopped early]")?;
        }
        Ok(())
    }
}

/// Outcome of driving one record through the chain.
#[derive(Debug)]
enum RecordOutcome {
    Succeeded { method: FetchMethod, tier: QualityTier },
    Failed { attempts: u32 },
    /// Text was acquired but could not be persisted; the record is unchanged.
    Errored,
}

pub struct Coordinator {
    config: RunConfig,
    store: ReviewStore,
    ledger_store: LedgerStore,
    archive: ArchiveWriter,
    chain: MethodChain,
    pacer: Pacer,
    state: RunState,
    stop: Arc<AtomicBool>,
}

impl Coordinator {
    /// Coordinator with the standard direct / proxy / snapshot chain.
    pub fn new(config: RunConfig) -> Result<Self> {
        let methods = standard_methods(&config);
        Self::with_methods(config, methods)
    }

    pub fn with_methods(config: RunConfig, methods: Vec<Box<dyn RetrievalMethod>>) -> Result<Self> {
        config.validate()?;
        let chain = MethodChain::new(methods, config.min_words, config.attempt_timeout());
        let pacer = Pacer::new(config.delay_min_ms, config.delay_max_ms, config.seed);

        Ok(Self {
            store: ReviewStore::new(&config.data_dir),
            ledger_store: LedgerStore::new(config.ledger_path()),
            archive: ArchiveWriter::new(&config.data_dir),
            chain,
            pacer,
            state: RunState::Idle,
            stop: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn ledger_store(&self) -> &LedgerStore {
        &self.ledger_store
    }

    /// Flag that, once set, ends the run after the record in flight.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Run one pass. The ledger is handed in and handed back updated.
    ///
    /// Only an unreadable record store is fatal; every other failure is
    /// contained to the record it happened on.
    pub async fn run(&mut self, mut ledger: FailureLedger) -> Result<(RunSummary, FailureLedger)> {
        self.transition(RunState::Selecting);
        let records = self
            .store
            .load_all()
            .with_context(|| format!("Failed to read records under {}", self.store.data_dir().display()))?;
        let worklist = select_work(
            records,
            &ledger,
            &Selection {
                min_words: self.config.min_words,
                limit: self.config.limit,
                show: self.config.show.as_deref(),
            },
        );

        let total = worklist.len();
        let mut summary = RunSummary { selected: total, ..RunSummary::default() };
        let mut dirty = false;
        tracing::info!(
            records = total,
            methods = ?self.chain.method_kinds(),
            "Starting acquisition run"
        );

        for (index, stored) in worklist.into_iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                tracing::warn!(remaining = total - index, "Stop requested; draining");
                summary.stopped_early = true;
                break;
            }
            self.transition(RunState::Processing { index, total });
            tracing::info!(
                n = index + 1,
                of = total,
                show = %stored.record.show_id,
                outlet = %stored.record.outlet_id,
                "Processing record"
            );

            match self.process_record(&stored, &mut ledger, &mut dirty).await {
                RecordOutcome::Succeeded { method, tier } => {
                    summary.succeeded += 1;
                    *summary.by_method.entry(method).or_default() += 1;
                    *summary.by_tier.entry(tier).or_default() += 1;
                }
                RecordOutcome::Failed { attempts } => {
                    summary.failed += 1;
                    tracing::debug!(locator = %stored.locator, attempts, "Recorded failure");
                }
                RecordOutcome::Errored => summary.failed += 1,
            }
            summary.processed += 1;

            if summary.processed % self.config.checkpoint_every == 0 {
                self.checkpoint(&ledger, &mut dirty);
                tracing::info!(
                    processed = summary.processed,
                    of = total,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "Checkpoint"
                );
            }

            if index + 1 < total && !self.stop.load(Ordering::SeqCst) {
                self.pacer.pause().await;
            }
        }

        self.transition(RunState::Draining);
        self.checkpoint(&ledger, &mut dirty);
        tracing::info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            success_rate = %format!("{:.1}%", summary.success_rate()),
            "Run complete"
        );
        self.transition(RunState::Idle);

        Ok((summary, ledger))
    }

    async fn process_record(
        &mut self,
        stored: &StoredRecord,
        ledger: &mut FailureLedger,
        dirty: &mut bool,
    ) -> RecordOutcome {
        let Some(url) = stored.record.source_url() else {
            // The selector only hands out records with a URL.
            return RecordOutcome::Failed { attempts: ledger.attempts(&stored.locator) };
        };

        match self.chain.acquire(url, &stored.record.show_id, &mut self.pacer).await {
            ChainOutcome::Accepted(retrieved) => {
                let method = retrieved.method;
                match self.persist_success(stored, url, retrieved) {
                    Ok(tier) => {
                        if ledger.clear(&stored.locator) {
                            *dirty = true;
                        }
                        tracing::info!(url, method = %method, tier = %tier, "Record complete");
                        RecordOutcome::Succeeded { method, tier }
                    }
                    Err(e) => {
                        tracing::error!(locator = %stored.locator, error = %format!("{e:#}"), "Failed to persist acquired text");
                        RecordOutcome::Errored
                    }
                }
            }
            ChainOutcome::Exhausted(failures) => {
                let attempts = ledger.record_failure(&stored.locator, url, failures, Utc::now());
                *dirty = true;
                tracing::warn!(url, attempts, "All retrieval methods failed");
                RecordOutcome::Failed { attempts }
            }
        }
    }

    /// Archive the raw capture, then rewrite the record with its text.
    fn persist_success(&self, stored: &StoredRecord, url: &str, retrieved: Retrieved) -> Result<QualityTier> {
        let fetched_at = Utc::now();
        let archive_path = self
            .archive
            .write(&stored.record, url, retrieved.method, &retrieved.raw, fetched_at)
            .context("Failed to write archive")?;
        let tier = classify(&retrieved.text, &stored.record.show_title());

        let mut updated = stored.clone();
        updated.record.apply_acquisition(AcquiredText {
            text: retrieved.text,
            word_count: retrieved.word_count,
            method: retrieved.method,
            quality: tier,
            fetched_at,
            archive_path,
        });
        self.store
            .save(&updated)
            .with_context(|| format!("Failed to save {}", stored.locator))?;
        Ok(tier)
    }

    fn checkpoint(&self, ledger: &FailureLedger, dirty: &mut bool) {
        if !*dirty {
            return;
        }
        match self.ledger_store.save(ledger) {
            Ok(()) => *dirty = false,
            Err(e) => tracing::error!(error = %e, "Failed to flush failure ledger"),
        }
    }

    fn transition(&mut self, next: RunState) {
        tracing::trace!(from = ?self.state, to = ?next, "Run state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::{article_page, stub_page, FakeMethod};
    use crate::error::FetchError;
    use crate::methods::FetchRequest;
    use async_trait::async_trait;
    use curtaincall_model::{MethodFailure, ReviewRecord, TextStatus, RETRY_CAP};
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const LOCATOR: &str = "reviews/hamilton-2015/nytimes--ben-brantley.json";

    fn config(dir: &Path) -> RunConfig {
        RunConfig {
            data_dir: dir.to_path_buf(),
            delay_min_ms: 0,
            delay_max_ms: 0,
            seed: Some(11),
            attempt_timeout_secs: 5,
            ..RunConfig::default()
        }
    }

    fn seed_record(dir: &Path, locator: &str, record: &ReviewRecord) {
        let path = dir.join(locator);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string_pretty(record).unwrap()).unwrap();
    }

    fn hamilton() -> ReviewRecord {
        ReviewRecord::new(
            "hamilton-2015",
            "nytimes",
            Some("Ben Brantley"),
            Some("https://www.nytimes.com/2015/08/07/theater/review-hamilton.html"),
        )
    }

    fn load(dir: &Path, locator: &str) -> ReviewRecord {
        serde_json::from_str(&std::fs::read_to_string(dir.join(locator)).unwrap()).unwrap()
    }

    fn fakes(responses: [Result<String, u16>; 3]) -> (Vec<Box<dyn RetrievalMethod>>, Vec<Arc<AtomicUsize>>) {
        let mut methods: Vec<Box<dyn RetrievalMethod>> = Vec::new();
        let mut counters = Vec::new();
        for (kind, response) in FetchMethod::ALL.into_iter().zip(responses) {
            let (method, calls) = match response {
                Ok(html) => FakeMethod::ok(kind, html),
                Err(status) => FakeMethod::status(kind, status),
            };
            methods.push(Box::new(method));
            counters.push(calls);
        }
        (methods, counters)
    }

    async fn run_once(dir: &Path, responses: [Result<String, u16>; 3]) -> (RunSummary, Vec<usize>) {
        let (methods, counters) = fakes(responses);
        let mut coordinator = Coordinator::with_methods(config(dir), methods).unwrap();
        let ledger = coordinator.ledger_store().load().unwrap();
        let (summary, ledger) = coordinator.run(ledger).await.unwrap();
        assert_eq!(coordinator.state(), RunState::Idle);
        assert_eq!(&coordinator.ledger_store().load().unwrap(), &ledger);
        (summary, counters.iter().map(|c| c.load(Ordering::SeqCst)).collect())
    }

    fn stubs() -> [Result<String, u16>; 3] {
        [Ok(stub_page()), Ok(stub_page()), Ok(stub_page())]
    }

    #[tokio::test]
    async fn test_direct_success_full_tier() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), LOCATOR, &hamilton());

        let (summary, calls) = run_once(tmp.path(), [Ok(article_page(6)), Ok(article_page(6)), Err(500)]).await;

        assert_eq!((summary.processed, summary.succeeded, summary.failed), (1, 1, 0));
        assert_eq!(calls, vec![1, 0, 0]);

        let record = load(tmp.path(), LOCATOR);
        assert_eq!(record.text_status, TextStatus::Complete);
        assert_eq!(record.fetch_method, Some(FetchMethod::Direct));
        assert_eq!(record.text_quality, Some(QualityTier::Full));
        assert!(record.word_count.unwrap() > 300);
        assert!(record.full_text.as_deref().unwrap().chars().count() > 2000);

        let archive = record.archive_path.unwrap();
        assert!(archive.starts_with("archives/hamilton-2015/nytimes--ben-brantley--"));
        let archived = std::fs::read_to_string(tmp.path().join(&archive)).unwrap();
        assert!(archived.contains("method: direct"));
        assert!(archived.contains("<article>"));

        assert!(!tmp.path().join("failed-fetches.json").exists());
    }

    #[tokio::test]
    async fn test_blocked_live_page_recovered_from_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), LOCATOR, &hamilton());

        let (summary, calls) = run_once(tmp.path(), [Err(403), Err(403), Ok(article_page(7))]).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.by_method.get(&FetchMethod::Snapshot), Some(&1));
        assert_eq!(calls, vec![1, 1, 1]);
        let record = load(tmp.path(), LOCATOR);
        assert_eq!(record.fetch_method, Some(FetchMethod::Snapshot));
        assert_eq!(record.text_quality, Some(QualityTier::Full));
    }

    #[tokio::test]
    async fn test_all_methods_rejected_creates_ledger_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let original = hamilton();
        seed_record(tmp.path(), LOCATOR, &original);

        let (summary, _) = run_once(tmp.path(), stubs()).await;

        assert_eq!((summary.processed, summary.failed), (1, 1));
        assert_eq!(load(tmp.path(), LOCATOR), original);

        let ledger = LedgerStore::new(tmp.path().join("failed-fetches.json")).load().unwrap();
        let entry = ledger.get(LOCATOR).unwrap();
        assert_eq!(entry.attempts, 1);
        let methods: Vec<_> = entry.errors.iter().map(|e| e.method).collect();
        assert_eq!(methods, FetchMethod::ALL.to_vec());
        assert!(entry.errors.iter().all(|e| e.error.starts_with("too short")));
    }

    #[tokio::test]
    async fn test_third_failure_reaches_cap_and_is_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), LOCATOR, &hamilton());
        let ledger_store = LedgerStore::new(tmp.path().join("failed-fetches.json"));
        let mut ledger = FailureLedger::new();
        for _ in 0..2 {
            ledger.record_failure(LOCATOR, "https://x", vec![], Utc::now());
        }
        ledger_store.save(&ledger).unwrap();

        run_once(tmp.path(), stubs()).await;
        assert_eq!(ledger_store.load().unwrap().attempts(LOCATOR), RETRY_CAP);

        let (summary, calls) = run_once(tmp.path(), [Ok(article_page(6)), Ok(article_page(6)), Ok(article_page(6))]).await;
        assert_eq!(summary.selected, 0);
        assert_eq!(calls, vec![0, 0, 0]);
        assert_eq!(ledger_store.load().unwrap().attempts(LOCATOR), RETRY_CAP);
    }

    #[tokio::test]
    async fn test_consecutive_failures_count_runs() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), LOCATOR, &hamilton());
        let ledger_store = LedgerStore::new(tmp.path().join("failed-fetches.json"));

        for run in 1..=4u32 {
            run_once(tmp.path(), [Err(403), Err(429), Err(404)]).await;
            assert_eq!(ledger_store.load().unwrap().attempts(LOCATOR), run.min(RETRY_CAP));
        }
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), LOCATOR, &hamilton());
        run_once(tmp.path(), [Ok(article_page(6)), Err(500), Err(500)]).await;
        let before = std::fs::read(tmp.path().join(LOCATOR)).unwrap();
        let archives_before = std::fs::read_dir(tmp.path().join("archives/hamilton-2015")).unwrap().count();

        let (summary, calls) = run_once(tmp.path(), [Ok(article_page(6)), Ok(article_page(6)), Ok(article_page(6))]).await;

        assert_eq!(summary.processed, 0);
        assert_eq!(calls, vec![0, 0, 0]);
        assert_eq!(std::fs::read(tmp.path().join(LOCATOR)).unwrap(), before);
        assert_eq!(std::fs::read_dir(tmp.path().join("archives/hamilton-2015")).unwrap().count(), archives_before);
        assert!(!tmp.path().join("failed-fetches.json").exists());
    }

    #[tokio::test]
    async fn test_success_clears_previous_failure() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), LOCATOR, &hamilton());
        run_once(tmp.path(), [Err(403), Err(403), Err(403)]).await;
        run_once(tmp.path(), [Err(403), Ok(article_page(6)), Err(403)]).await;

        let ledger = LedgerStore::new(tmp.path().join("failed-fetches.json")).load().unwrap();
        assert!(ledger.is_empty());
        assert_eq!(load(tmp.path(), LOCATOR).fetch_method, Some(FetchMethod::Proxy));
    }

    #[tokio::test]
    async fn test_persistence_error_is_contained_to_record() {
        let tmp = tempfile::tempdir().unwrap();
        let blocked = "reviews/hamilton-2015/a-blocked.json";
        let original = ReviewRecord::new("hamilton-2015", "a-blocked", None, Some("https://a"));
        seed_record(tmp.path(), blocked, &original);
        seed_record(tmp.path(), LOCATOR, &hamilton());
        // A directory where the temp file would go makes the rewrite fail.
        std::fs::create_dir_all(tmp.path().join("reviews/hamilton-2015/.a-blocked.json.tmp")).unwrap();

        let (summary, _) = run_once(tmp.path(), [Ok(article_page(6)), Err(500), Err(500)]).await;

        assert_eq!((summary.processed, summary.succeeded, summary.failed), (2, 1, 1));
        assert_eq!(load(tmp.path(), blocked), original);
        assert_eq!(load(tmp.path(), LOCATOR).text_status, TextStatus::Complete);
    }

    /// Fails every call and records how many ledger entries were durable at call time.
    struct LedgerProbe {
        ledger_path: std::path::PathBuf,
        seen: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl RetrievalMethod for LedgerProbe {
        fn kind(&self) -> FetchMethod {
            FetchMethod::Direct
        }

        async fn fetch(&self, _request: &FetchRequest) -> Result<String, FetchError> {
            let durable = LedgerStore::new(&self.ledger_path).load().map(|l| l.len()).unwrap_or(0);
            self.seen.lock().unwrap().push(durable);
            Err(FetchError::Status { status: 403 })
        }
    }

    #[tokio::test]
    async fn test_ledger_flushed_at_checkpoints() {
        let tmp = tempfile::tempdir().unwrap();
        for i in 0..4 {
            let outlet = format!("outlet{i}");
            seed_record(
                tmp.path(),
                &format!("reviews/hamilton-2015/{outlet}.json"),
                &ReviewRecord::new("hamilton-2015", &outlet, None, Some("https://x")),
            );
        }
        let seen = Arc::new(Mutex::new(Vec::new()));
        let probe = LedgerProbe { ledger_path: tmp.path().join("failed-fetches.json"), seen: seen.clone() };
        let config = RunConfig { checkpoint_every: 2, ..config(tmp.path()) };
        let mut coordinator = Coordinator::with_methods(config, vec![Box::new(probe)]).unwrap();

        let (summary, ledger) = coordinator.run(FailureLedger::new()).await.unwrap();

        assert_eq!(summary.failed, 4);
        assert_eq!(ledger.len(), 4);
        assert_eq!(*seen.lock().unwrap(), vec![0, 0, 2, 2]);
        assert_eq!(coordinator.ledger_store().load().unwrap().len(), 4);
    }

    /// Succeeds, and asks the run to stop as soon as it is called.
    struct StopAfterFirst {
        stop: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RetrievalMethod for StopAfterFirst {
        fn kind(&self) -> FetchMethod {
            FetchMethod::Direct
        }

        async fn fetch(&self, _request: &FetchRequest) -> Result<String, FetchError> {
            self.stop.store(true, Ordering::SeqCst);
            Ok(article_page(6))
        }
    }

    #[tokio::test]
    async fn test_stop_between_records() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), "reviews/hamilton-2015/a.json", &ReviewRecord::new("hamilton-2015", "a", None, Some("https://a")));
        seed_record(tmp.path(), "reviews/hamilton-2015/b.json", &ReviewRecord::new("hamilton-2015", "b", None, Some("https://b")));

        let stop = Arc::new(AtomicBool::new(false));
        let mut coordinator = Coordinator::with_methods(config(tmp.path()), vec![]).unwrap();
        coordinator.stop = stop.clone();
        coordinator.chain = MethodChain::new(
            vec![Box::new(StopAfterFirst { stop })],
            300,
            std::time::Duration::from_secs(5),
        );

        let (summary, _) = coordinator.run(FailureLedger::new()).await.unwrap();

        assert_eq!((summary.selected, summary.processed, summary.succeeded), (2, 1, 1));
        assert!(summary.stopped_early);
        assert_eq!(load(tmp.path(), "reviews/hamilton-2015/b.json").text_status, TextStatus::Pending);
    }

    #[tokio::test]
    async fn test_stop_skips_pause_before_next_record() {
        let tmp = tempfile::tempdir().unwrap();
        seed_record(tmp.path(), "reviews/hamilton-2015/a.json", &ReviewRecord::new("hamilton-2015", "a", None, Some("https://a")));
        seed_record(tmp.path(), "reviews/hamilton-2015/b.json", &ReviewRecord::new("hamilton-2015", "b", None, Some("https://b")));

        let config = RunConfig { delay_min_ms: 60_000, delay_max_ms: 60_000, ..config(tmp.path()) };
        let stop = Arc::new(AtomicBool::new(false));
        let mut coordinator = Coordinator::with_methods(config, vec![]).unwrap();
        coordinator.stop = stop.clone();
        coordinator.chain = MethodChain::new(
            vec![Box::new(StopAfterFirst { stop })],
            300,
            std::time::Duration::from_secs(5),
        );

        let (summary, _) = tokio::time::timeout(std::time::Duration::from_secs(10), coordinator.run(FailureLedger::new()))
            .await
            .expect("stopped run should not wait out the inter-record delay")
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert!(summary.stopped_early);
    }

    #[tokio::test]
    async fn test_limit_and_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let (summary, _) = run_once(tmp.path(), stubs()).await;
        assert_eq!(summary, RunSummary::default());

        for outlet in ["a", "b", "c"] {
            seed_record(
                tmp.path(),
                &format!("reviews/hamilton-2015/{outlet}.json"),
                &ReviewRecord::new("hamilton-2015", outlet, None, Some("https://x")),
            );
        }
        let config = RunConfig { limit: 2, ..config(tmp.path()) };
        let (methods, _) = fakes(stubs());
        let mut coordinator = Coordinator::with_methods(config, methods).unwrap();
        let (summary, ledger) = coordinator.run(FailureLedger::new()).await.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get("reviews/hamilton-2015/c.json").is_none());
    }

    #[test]
    fn test_summary_display() {
        let mut summary = RunSummary { selected: 4, processed: 4, succeeded: 3, failed: 1, ..Default::default() };
        summary.by_method.insert(FetchMethod::Direct, 2);
        summary.by_method.insert(FetchMethod::Snapshot, 1);
        summary.by_tier.insert(QualityTier::Full, 3);

        assert_eq!(summary.success_rate(), 75.0);
        assert_eq!(
            summary.to_string(),
            "processed 4 of 4, succeeded 3, failed 1 (75.0% success); methods: direct=2, snapshot=1; tiers: full=3"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let config = RunConfig { checkpoint_every: 0, ..config(tmp.path()) };
        assert!(Coordinator::with_methods(config, vec![]).is_err());
    }

    #[test]
    fn test_failure_reasons_shape() {
        let failure = MethodFailure { method: FetchMethod::Proxy, error: "HTTP 403".into() };
        assert_eq!(serde_json::to_value(&failure).unwrap()["method"], "proxy");
    }
}
