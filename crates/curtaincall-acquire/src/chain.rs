// The retrieval method chain.
//
// Methods run strictly in order, each at most once per record. A method's
// own error or a validation rejection of its content both become that
// method's recorded reason; the first accepted body stops the chain.

use curtaincall_model::{FetchMethod, MethodFailure};
use curtaincall_validate::validate_candidate;
use std::time::Duration;

use crate::error::FetchError;
use crate::extract::extract_article_text;
use crate::methods::{FetchRequest, RetrievalMethod};
use crate::pacing::Pacer;

/// Content from the method whose body passed validation.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub method: FetchMethod,
    pub raw: String,
    pub text: String,
    pub word_count: usize,
}

#[derive(Debug)]
pub enum ChainOutcome {
    Accepted(Retrieved),
    Exhausted(Vec<MethodFailure>),
}

pub struct MethodChain {
    methods: Vec<Box<dyn RetrievalMethod>>,
    min_words: usize,
    timeout: Duration,
}

impl MethodChain {
    pub fn new(methods: Vec<Box<dyn RetrievalMethod>>, min_words: usize, timeout: Duration) -> Self {
        Self { methods, min_words, timeout }
    }

    pub fn method_kinds(&self) -> Vec<FetchMethod> {
        self.methods.iter().map(|m| m.kind()).collect()
    }

    /// Run the chain for one record's URL.
    pub async fn acquire(&self, url: &str, show_id: &str, pacer: &mut Pacer) -> ChainOutcome {
        let mut failures = Vec::with_capacity(self.methods.len());

        for method in &self.methods {
            let kind = method.kind();
            let request = FetchRequest {
                url: url.to_string(),
                identity: pacer.next_identity(),
                scroll: pacer.next_scroll_plan(),
                timeout: self.timeout,
            };

            tracing::info!(url, method = %kind, "Attempting retrieval");
            match self.attempt(method.as_ref(), &request, show_id).await {
                Ok(retrieved) => {
                    tracing::info!(url, method = %kind, words = retrieved.word_count, "Retrieval accepted");
                    return ChainOutcome::Accepted(retrieved);
                }
                Err(reason) => {
                    tracing::warn!(url, method = %kind, reason = %reason, "Retrieval failed");
                    failures.push(MethodFailure { method: kind, error: reason });
                }
            }
        }

        ChainOutcome::Exhausted(failures)
    }

    async fn attempt(
        &self,
        method: &dyn RetrievalMethod,
        request: &FetchRequest,
        show_id: &str,
    ) -> Result<Retrieved, String> {
        // Dropping the future on timeout tears down the attempt's client with it.
        let raw = match tokio::time::timeout(self.timeout, method.fetch(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(e.to_string()),
            Err(_) => return Err(FetchError::Timeout(self.timeout.as_secs()).to_string()),
        };

        let text = extract_article_text(&raw);
        let accepted = validate_candidate(&text, show_id, self.min_words).map_err(|r| r.to_string())?;

        Ok(Retrieved {
            method: method.kind(),
            raw,
            text,
            word_count: accepted.word_count,
        })
    }
}
