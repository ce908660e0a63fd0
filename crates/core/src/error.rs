use thiserror::Error;

/// Error kinds named in the error-handling design: renderer, parse,
/// classifier transport/response, persistence, and programming errors.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("renderer error: {0}")]
    Render(String),

    #[error("timeout after {0}s")]
    Timeout(u64),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("html parse error: {0}")]
    Parse(String),

    #[error("classifier transport error: {0}")]
    ClassifierTransport(String),

    #[error("classifier rate limited")]
    ClassifierRateLimited,

    #[error("classifier response invalid after retries: {0}")]
    ClassifierResponse(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CrawlError {
    /// True for errors that should be retried with backoff rather than
    /// surfaced to the page row immediately.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CrawlError::ClassifierRateLimited)
    }
}
