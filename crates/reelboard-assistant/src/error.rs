use thiserror::Error;

/// Errors returned by the `OpenRouter` client.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `OpenRouter` answered with a non-2xx status.
    #[error("OpenRouter API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The completion did not call the expected tool.
    #[error("completion did not call the {expected} tool")]
    MissingToolCall { expected: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
