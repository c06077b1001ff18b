use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single retrieval method attempt.
///
/// These never abort a record: the chain records the message as the
/// method's reason and moves on to the next method.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("unexpected backend response: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status { status: status.as_u16() },
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Failure to read or write one of the persistent files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json { path: path.into(), source }
    }
}
