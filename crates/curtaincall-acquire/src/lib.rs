pub mod archive;
pub mod chain;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod methods;
pub mod normalize;
pub mod pacing;
pub mod report;
pub mod selector;
pub mod store;

pub use config::RunConfig;
pub use coordinator::{Coordinator, RunSummary};
pub use error::{FetchError, StoreError};
