use async_trait::async_trait;
use curtaincall_model::FetchMethod;
use serde::Deserialize;
use serde_json::json;

use super::{FetchRequest, RetrievalMethod};
use crate::error::FetchError;

/// Time the page gets to settle after navigation and scrolling.
const SETTLE_MS: u64 = 2000;

/// Script run inside a fresh browser page by the browser service.
///
/// Presents the chosen identity, hides the webdriver flag, scrolls in
/// steps, waits for late content, and hands back status plus markup.
const BROWSER_SCRIPT: &str = r#"
export default async function ({ page, context }) {
  await page.setUserAgent(context.userAgent);
  await page.setViewport(context.viewport);
  await page.setExtraHTTPHeaders({ 'Accept-Language': context.acceptLanguage });
  await page.evaluateOnNewDocument(() => {
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    window.chrome = window.chrome || { runtime: {} };
  });
  const response = await page.goto(context.url, {
    waitUntil: 'domcontentloaded',
    timeout: context.timeoutMs,
  });
  const status = response ? response.status() : 0;
  for (let i = 0; i < context.scroll.steps; i++) {
    await page.evaluate((y) => window.scrollBy(0, y), context.scroll.stepPx);
    await new Promise((r) => setTimeout(r, context.scroll.pauseMs));
  }
  await new Promise((r) => setTimeout(r, context.settleMs));
  const html = await page.content();
  await page.close();
  return { data: { status, html }, type: 'application/json' };
}
"#;

/// Automated browser fetch through a Browserless-compatible `/function` endpoint.
pub struct DirectBrowserMethod {
    endpoint: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrowserPage {
    status: u16,
    html: String,
}

impl DirectBrowserMethod {
    pub fn new(endpoint: &str, token: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(String::from),
        }
    }

    fn function_url(&self) -> String {
        let mut url = format!("{}/function?stealth=true", self.endpoint);
        if let Some(ref token) = self.token {
            url.push_str(&format!("&token={token}"));
        }
        url
    }

    fn payload(request: &FetchRequest) -> serde_json::Value {
        json!({
            "code": BROWSER_SCRIPT,
            "context": {
                "url": request.url,
                "userAgent": request.identity.user_agent,
                "viewport": request.identity.viewport,
                "acceptLanguage": request.identity.accept_language,
                "scroll": request.scroll,
                "settleMs": SETTLE_MS,
                "timeoutMs": request.timeout.as_millis() as u64,
            },
        })
    }
}

#[async_trait]
impl RetrievalMethod for DirectBrowserMethod {
    fn kind(&self) -> FetchMethod {
        FetchMethod::Direct
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        // The identity is applied inside the page, not to the service call.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(url = %request.url, user_agent = request.identity.user_agent, "Driving browser session");
        let response = client
            .post(self.function_url())
            .json(&Self::payload(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Backend(format!(
                "browser service returned {status}: {}",
                message.chars().take(200).collect::<String>()
            )));
        }

        let page: BrowserPage = response
            .json()
            .await
            .map_err(|e| FetchError::Backend(format!("malformed browser response: {e}")))?;

        if page.status == 0 {
            return Err(FetchError::Network("navigation failed".into()));
        }
        if page.status >= 400 {
            return Err(FetchError::Status { status: page.status });
        }
        Ok(page.html)
    }
}
