use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use curtaincall_acquire::extract::extract_article_text;
use curtaincall_acquire::report::collection_status;
use curtaincall_acquire::store::{LedgerStore, ReviewStore};
use curtaincall_acquire::{Coordinator, RunConfig};
use curtaincall_model::text;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Parser)]
#[command(name = "curtaincall")]
#[command(about = "Review text acquisition for theatrical productions")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// Data directory holding reviews/, archives/ and the failure ledger
    #[arg(short, long, global = true, default_value = "data", env = "CURTAINCALL_DATA_DIR")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire full review text for records that still need it
    Run(RunArgs),

    /// Summarize acquisition progress per show
    Status {
        /// Minimum word count for text to count as complete
        #[arg(long, default_value_t = curtaincall_validate::DEFAULT_MIN_WORDS)]
        min_words: usize,
    },

    /// Inspect or reset the failure ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// Run extraction, validation and classification on a saved page
    Extract {
        /// Path to a saved HTML page
        file: PathBuf,

        /// Show id the page should be about (e.g., "hamilton-2015")
        #[arg(short, long)]
        show: String,

        #[arg(long, default_value_t = curtaincall_validate::DEFAULT_MIN_WORDS)]
        min_words: usize,

        /// Print the extracted text
        #[arg(long)]
        print: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Maximum records to process this run (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    limit: usize,

    /// Only process records for this show id
    #[arg(short, long)]
    show: Option<String>,

    /// Minimum word count for acquired text
    #[arg(long, default_value_t = curtaincall_validate::DEFAULT_MIN_WORDS)]
    min_words: usize,

    /// Lower bound of the pause between records, in milliseconds
    #[arg(long, default_value_t = 2000)]
    delay_min_ms: u64,

    /// Upper bound of the pause between records, in milliseconds
    #[arg(long, default_value_t = 5000)]
    delay_max_ms: u64,

    /// Flush the failure ledger every N records
    #[arg(long, default_value_t = 10)]
    checkpoint_every: usize,

    /// Timeout for a single retrieval attempt, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Browser service endpoint for direct fetches
    #[arg(long, default_value = curtaincall_acquire::config::DEFAULT_BROWSER_ENDPOINT)]
    browser_endpoint: String,

    /// Browser service token
    #[arg(long, env = "CURTAINCALL_BROWSER_TOKEN", hide_env_values = true)]
    browser_token: Option<String>,

    /// Managed proxy API key; the proxy method is skipped without it
    #[arg(long, env = "SCRAPINGBEE_API_KEY", hide_env_values = true)]
    proxy_api_key: Option<String>,

    /// Year requested from the snapshot archive
    #[arg(long, default_value_t = curtaincall_acquire::config::DEFAULT_SNAPSHOT_YEAR)]
    snapshot_year: u16,

    /// Seed for delays and client identities (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum LedgerAction {
    /// List ledger entries
    List {
        /// Only entries that reached the retry cap
        #[arg(long)]
        exhausted: bool,
    },

    /// Remove entries so their records are retried
    Reset {
        /// Reset every entry
        #[arg(long, conflicts_with_all = ["show", "locator"])]
        all: bool,

        /// Reset entries for one show id
        #[arg(long, conflicts_with = "locator")]
        show: Option<String>,

        /// Reset one entry by record locator (e.g., "reviews/hamilton-2015/nytimes.json")
        #[arg(long)]
        locator: Option<String>,
    },
}

impl RunArgs {
    fn into_config(self, data_dir: PathBuf) -> RunConfig {
        RunConfig {
            data_dir,
            limit: self.limit,
            min_words: self.min_words,
            delay_min_ms: self.delay_min_ms,
            delay_max_ms: self.delay_max_ms,
            checkpoint_every: self.checkpoint_every,
            attempt_timeout_secs: self.timeout_secs,
            browser_endpoint: self.browser_endpoint,
            browser_token: self.browser_token,
            proxy_api_key: self.proxy_api_key,
            snapshot_year: self.snapshot_year,
            seed: self.seed,
            show: self.show,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let data_dir = cli.data_dir;
    match cli.command {
        Commands::Run(args) => {
            let config = args.into_config(data_dir);
            tracing::info!(
                data_dir = %config.data_dir.display(),
                limit = config.limit,
                show = ?config.show,
                proxy = config.proxy_api_key.is_some(),
                "Starting review text acquisition"
            );

            let mut coordinator = Coordinator::new(config)?;
            let ledger = coordinator
                .ledger_store()
                .load()
                .context("Failed to read failure ledger")?;

            let stop = coordinator.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received; finishing current record");
                    stop.store(true, Ordering::SeqCst);
                }
            });

            let (summary, ledger) = coordinator.run(ledger).await?;
            tracing::info!(
                ledger_entries = ledger.len(),
                exhausted = ledger.exhausted().count(),
                "{summary}"
            );
        }
        Commands::Status { min_words } => {
            let records = ReviewStore::new(&data_dir).load_all()?;
            let ledger = LedgerStore::new(data_dir.join("failed-fetches.json")).load()?;
            let shows = collection_status(&records, &ledger, min_words);

            for (show, s) in &shows {
                let tiers: Vec<String> = s.tiers.iter().map(|(t, n)| format!("{t}={n}")).collect();
                tracing::info!(
                    show = %show,
                    total = s.total,
                    complete = s.complete,
                    pending = s.pending,
                    missing_url = s.missing_url,
                    capped = s.capped,
                    tiers = %tiers.join(","),
                    "Status"
                );
            }
            let total: usize = shows.values().map(|s| s.total).sum();
            let complete: usize = shows.values().map(|s| s.complete).sum();
            tracing::info!(shows = shows.len(), records = total, complete, "Collection totals");
        }
        Commands::Ledger { action } => {
            let store = LedgerStore::new(data_dir.join("failed-fetches.json"));
            let mut ledger = store.load()?;
            match action {
                LedgerAction::List { exhausted } => {
                    for entry in ledger.entries.iter().filter(|e| !exhausted || e.is_exhausted()) {
                        tracing::info!(
                            locator = %entry.file_path,
                            url = %entry.url,
                            attempts = entry.attempts,
                            last_attempt = %entry.last_attempt.to_rfc3339(),
                            "Failed record"
                        );
                        for e in &entry.errors {
                            tracing::info!(method = %e.method, "  {}", e.error);
                        }
                    }
                    tracing::info!(entries = ledger.len(), exhausted = ledger.exhausted().count(), "Ledger");
                }
                LedgerAction::Reset { all, show, locator } => {
                    let removed = if all {
                        ledger.reset_where(|_| true)
                    } else if let Some(show) = show {
                        let prefix = format!("reviews/{show}/");
                        ledger.reset_where(|e| e.file_path.starts_with(&prefix))
                    } else if let Some(locator) = locator {
                        usize::from(ledger.clear(&locator))
                    } else {
                        anyhow::bail!("Specify --all, --show, or --locator");
                    };
                    store.save(&ledger)?;
                    tracing::info!(removed, remaining = ledger.len(), path = %store.path().display(), "Reset ledger entries");
                }
            }
        }
        Commands::Extract { file, show, min_words, print } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let body = extract_article_text(&html);
            let title = text::show_title(&show);
            let tier = curtaincall_validate::classify(&body, &title);

            tracing::info!(
                chars = body.chars().count(),
                words = text::word_count(&body),
                title = %title,
                tier = %tier,
                "Extracted"
            );
            match curtaincall_validate::validate_candidate(&body, &show, min_words) {
                Ok(accepted) => tracing::info!(words = accepted.word_count, "Accepted"),
                Err(reason) => tracing::warn!(reason = %reason, "Rejected"),
            }
            if print {
                println!("{body}");
            }
        }
    }

    Ok(())
}
