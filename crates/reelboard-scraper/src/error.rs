use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid profile URL for handle \"{handle}\": {reason}")]
    InvalidProfileUrl { handle: String, reason: String },
}

/// Why live extraction did not produce a usable record.
///
/// Both variants end in the fallback estimate; they are kept apart so logs
/// and the `fallbackReason` response field can tell them apart.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("profile page could not be fetched: {0}")]
    Fetch(#[from] ScraperError),

    #[error("profile page had no parsable follower count")]
    NoPrimaryMetric,
}
