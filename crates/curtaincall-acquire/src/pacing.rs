// Request pacing and client-identity randomization.
//
// All randomness flows through one seedable RNG so runs can be replayed
// and tests can check bounds deterministically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;

/// A realistic desktop browser presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentity {
    pub user_agent: &'static str,
    pub viewport: Viewport,
    pub accept_language: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// How the browser session scrolls before reading the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPlan {
    pub steps: u32,
    pub step_px: u32,
    pub pause_ms: u64,
}

const IDENTITY_POOL: &[ClientIdentity] = &[
    ClientIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        viewport: Viewport { width: 1920, height: 1080 },
        accept_language: "en-US,en;q=0.9",
    },
    ClientIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        viewport: Viewport { width: 1440, height: 900 },
        accept_language: "en-US,en;q=0.9",
    },
    ClientIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
        viewport: Viewport { width: 1680, height: 1050 },
        accept_language: "en-US,en;q=0.8",
    },
    ClientIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
        viewport: Viewport { width: 1536, height: 864 },
        accept_language: "en-US,en;q=0.5",
    },
    ClientIdentity {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        viewport: Viewport { width: 1366, height: 768 },
        accept_language: "en-GB,en;q=0.9",
    },
];

const SCROLL_STEPS: (u32, u32) = (3, 6);
const SCROLL_STEP_PX: (u32, u32) = (300, 800);
const SCROLL_PAUSE_MS: (u64, u64) = (200, 600);

pub struct Pacer {
    rng: StdRng,
    delay_min_ms: u64,
    delay_max_ms: u64,
}

impl Pacer {
    /// Build a pacer; `seed` makes every draw reproducible.
    pub fn new(delay_min_ms: u64, delay_max_ms: u64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            delay_min_ms: delay_min_ms.min(delay_max_ms),
            delay_max_ms,
        }
    }

    pub fn next_identity(&mut self) -> ClientIdentity {
        let idx = self.rng.random_range(0..IDENTITY_POOL.len());
        IDENTITY_POOL[idx].clone()
    }

    pub fn next_scroll_plan(&mut self) -> ScrollPlan {
        ScrollPlan {
            steps: self.rng.random_range(SCROLL_STEPS.0..=SCROLL_STEPS.1),
            step_px: self.rng.random_range(SCROLL_STEP_PX.0..=SCROLL_STEP_PX.1),
            pause_ms: self.rng.random_range(SCROLL_PAUSE_MS.0..=SCROLL_PAUSE_MS.1),
        }
    }

    /// Draw the pause to take before the next record.
    pub fn next_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.random_range(self.delay_min_ms..=self.delay_max_ms))
    }

    /// Sleep for a freshly drawn inter-request delay.
    pub async fn pause(&mut self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Pacing before next request");
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
