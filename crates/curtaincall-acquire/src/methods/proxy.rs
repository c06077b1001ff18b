use async_trait::async_trait;
use curtaincall_model::FetchMethod;

use super::{attempt_client, read_success_body, FetchRequest, RetrievalMethod};
use crate::error::FetchError;

const PROXY_API: &str = "https://app.scrapingbee.com/api/v1/";

/// Fetch through a managed scraping proxy (ScrapingBee API).
pub struct ProxyMethod {
    api_key: Option<String>,
}

impl ProxyMethod {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(String::from),
        }
    }

    fn query<'a>(api_key: &'a str, url: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("api_key", api_key),
            ("url", url),
            ("render_js", "true"),
            ("premium_proxy", "true"),
        ]
    }
}

#[async_trait]
impl RetrievalMethod for ProxyMethod {
    fn kind(&self) -> FetchMethod {
        FetchMethod::Proxy
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::NotConfigured("proxy credentials"))?;

        let client = attempt_client(&request.identity)?;
        tracing::debug!(url = %request.url, "Fetching through managed proxy");
        let response = client
            .get(PROXY_API)
            .query(&Self::query(api_key, &request.url))
            .send()
            .await?;

        read_success_body(response).await
    }
}
