use async_trait::async_trait;
use curtaincall_model::FetchMethod;

use super::{attempt_client, read_success_body, FetchRequest, RetrievalMethod};
use crate::error::FetchError;

const ARCHIVE_BASE: &str = "https://web.archive.org/web";

/// Fetch a historical copy from the web archive instead of the live page.
///
/// The archive redirects a year-prefixed URL to the closest capture,
/// which recovers reviews that are now paywalled, blocked, or gone.
pub struct SnapshotMethod {
    year: u16,
}

impl SnapshotMethod {
    pub fn new(year: u16) -> Self {
        Self { year }
    }

    pub fn snapshot_url(&self, url: &str) -> String {
        format!("{ARCHIVE_BASE}/{}/{}", self.year, url.trim())
    }
}

#[async_trait]
impl RetrievalMethod for SnapshotMethod {
    fn kind(&self) -> FetchMethod {
        FetchMethod::Snapshot
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let snapshot = self.snapshot_url(&request.url);
        let client = attempt_client(&request.identity)?;

        tracing::debug!(url = %snapshot, "Fetching archived snapshot");
        let response = client.get(&snapshot).send().await?;
        read_success_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_url() {
        let method = SnapshotMethod::new(2024);
        assert_eq!(
            method.snapshot_url("https://www.theatermania.com/reviews/hamilton"),
            "https://web.archive.org/web/2024/https://www.theatermania.com/reviews/hamilton"
        );
    }

    #[test]
    fn test_snapshot_url_keeps_query() {
        let method = SnapshotMethod::new(2019);
        assert_eq!(
            method.snapshot_url(" https://example.com/a?b=c "),
            "https://web.archive.org/web/2019/https://example.com/a?b=c"
        );
    }
}
