// Retrieval methods: independent strategies for turning a URL into raw markup.
//
// Each attempt builds its own HTTP client and drops it when the attempt
// returns, so no connection or session state outlives a single attempt.
// Clients carry no timeout of their own: the chain owns the attempt budget.

use async_trait::async_trait;
use curtaincall_model::FetchMethod;
use std::time::Duration;

use crate::config::RunConfig;
use crate::error::FetchError;
use crate::pacing::{ClientIdentity, ScrollPlan};

pub mod direct;
pub mod proxy;
pub mod snapshot;

pub use direct::DirectBrowserMethod;
pub use proxy::ProxyMethod;
pub use snapshot::SnapshotMethod;

/// Everything one attempt needs, drawn fresh per attempt.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub identity: ClientIdentity,
    pub scroll: ScrollPlan,
    pub timeout: Duration,
}

/// The common "attempt retrieval" capability.
#[async_trait]
pub trait RetrievalMethod: Send + Sync {
    fn kind(&self) -> FetchMethod;

    /// Fetch raw content for the request's URL.
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError>;
}

/// The standard chain, in priority order: direct browser, managed proxy, snapshot.
pub fn standard_methods(config: &RunConfig) -> Vec<Box<dyn RetrievalMethod>> {
    vec![
        Box::new(DirectBrowserMethod::new(
            &config.browser_endpoint,
            config.browser_token.as_deref(),
        )),
        Box::new(ProxyMethod::new(config.proxy_api_key.as_deref())),
        Box::new(SnapshotMethod::new(config.snapshot_year)),
    ]
}

/// Build a client scoped to one attempt.
pub(crate) fn attempt_client(identity: &ClientIdentity) -> Result<reqwest::Client, FetchError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static(identity.accept_language),
    );

    reqwest::Client::builder()
        .user_agent(identity.user_agent)
        .default_headers(headers)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Read a body, turning non-success statuses into `FetchError::Status`.
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { status: status.as_u16() });
    }
    Ok(response.text().await?)
}
