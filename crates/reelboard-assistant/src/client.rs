//! HTTP client for the `OpenRouter` chat-completions endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::AssistantError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "kwaipilot/kat-coder-pro:free";

const APP_REFERER: &str = "http://localhost:3000";
const APP_TITLE: &str = "Reelboard";

/// Client for `OpenRouter`.
///
/// Use [`OpenRouterClient::new`] for production or
/// [`OpenRouterClient::with_base_url`] to point at a mock server in tests.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl OpenRouterClient {
    /// # Errors
    ///
    /// Returns [`AssistantError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AssistantError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`AssistantError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`AssistantError::InvalidBaseUrl`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Trailing slash so `join("chat/completions")` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AssistantError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn completions_url(&self) -> Result<Url, AssistantError> {
        self.base_url
            .join("chat/completions")
            .map_err(|e| AssistantError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// POSTs `payload` (with `model` filled in) and returns the response JSON.
    ///
    /// # Errors
    ///
    /// - [`AssistantError::Http`] on network failure.
    /// - [`AssistantError::Api`] on a non-2xx status.
    /// - [`AssistantError::Deserialize`] if the body is not JSON.
    pub async fn chat_completion(&self, mut payload: Value) -> Result<Value, AssistantError> {
        if let Value::Object(map) = &mut payload {
            map.insert("model".to_string(), Value::String(self.model.clone()));
        }
        let url = self.completions_url()?;

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), %message, "openrouter request failed");
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| AssistantError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
