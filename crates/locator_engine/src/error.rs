use locator_core::{ConfigError, FetchError};
use thiserror::Error;

/// A company-level failure: the company is skipped, the run goes on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Client(FetchError),
    #[error("could not load {url} after {attempts} attempt(s): {reason}")]
    PageUnavailable {
        url: String,
        reason: FetchError,
        attempts: u32,
    },
    #[error("no store locator link found on {url}")]
    NoStoreLink { url: String },
    #[error("no postal codes found on {url}")]
    NoStores { url: String },
}
