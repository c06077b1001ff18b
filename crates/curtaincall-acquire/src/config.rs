use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BROWSER_ENDPOINT: &str = "http://localhost:3000";
pub const DEFAULT_SNAPSHOT_YEAR: u16 = 2024;

/// Settings for one acquisition run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root of the data directory (`reviews/`, `archives/`, ledger file).
    pub data_dir: PathBuf,
    /// Maximum records taken into the worklist (0 = unlimited).
    pub limit: usize,
    /// Minimum word count for a body to be accepted.
    pub min_words: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Flush the ledger and log progress every N records.
    pub checkpoint_every: usize,
    pub attempt_timeout_secs: u64,
    pub browser_endpoint: String,
    #[serde(skip_serializing)]
    pub browser_token: Option<String>,
    #[serde(skip_serializing)]
    pub proxy_api_key: Option<String>,
    pub snapshot_year: u16,
    /// Seed for delays and client identities; random when unset.
    pub seed: Option<u64>,
    /// Restrict selection to one show id.
    pub show: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            limit: 0,
            min_words: curtaincall_validate::DEFAULT_MIN_WORDS,
            delay_min_ms: 2000,
            delay_max_ms: 5000,
            checkpoint_every: 10,
            attempt_timeout_secs: 30,
            browser_endpoint: DEFAULT_BROWSER_ENDPOINT.to_string(),
            browser_token: None,
            proxy_api_key: None,
            snapshot_year: DEFAULT_SNAPSHOT_YEAR,
            seed: None,
            show: None,
        }
    }
}

impl RunConfig {
    /// Reject inconsistent settings before any work starts.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.delay_min_ms <= self.delay_max_ms,
            "delay bounds are inverted: min {}ms > max {}ms",
            self.delay_min_ms,
            self.delay_max_ms
        );
        anyhow::ensure!(self.checkpoint_every > 0, "checkpoint interval must be at least 1");
        anyhow::ensure!(self.attempt_timeout_secs > 0, "attempt timeout must be at least 1s");
        anyhow::ensure!(self.min_words > 0, "minimum word count must be at least 1");
        anyhow::ensure!(
            (1996..=2100).contains(&self.snapshot_year),
            "snapshot year {} is outside the archive's range",
            self.snapshot_year
        );
        Ok(())
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn reviews_dir(&self) -> PathBuf {
        self.data_dir.join("reviews")
    }

    pub fn archives_dir(&self) -> PathBuf {
        self.data_dir.join("archives")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("failed-fetches.json")
    }
}
