use std::time::Duration;

use reelboard_core::Platform;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

pub const DEFAULT_TIKTOK_BASE_URL: &str = "https://www.tiktok.com";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// HTTP client for public profile pages (`{base}/@{handle}`).
///
/// Sends a desktop-browser `User-Agent` with HTML `Accept` headers, maps
/// 429 and other non-2xx statuses to typed errors, and retries transient
/// failures with exponential backoff.
pub struct ProfileClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
    tiktok_base_url: String,
    youtube_base_url: String,
}

impl ProfileClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
            tiktok_base_url: DEFAULT_TIKTOK_BASE_URL.to_string(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
        })
    }

    /// Points the client at different platform hosts (tests, proxies).
    #[must_use]
    pub fn with_base_urls(
        mut self,
        tiktok_base_url: impl Into<String>,
        youtube_base_url: impl Into<String>,
    ) -> Self {
        self.tiktok_base_url = tiktok_base_url.into();
        self.youtube_base_url = youtube_base_url.into();
        self
    }

    /// Builds `{base}/@{handle}`. The handle is percent-encoded as a single
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidProfileUrl`] for a blank handle or an
    /// unusable base URL.
    pub fn profile_url(&self, platform: Platform, handle: &str) -> Result<Url, ScraperError> {
        let invalid = |reason: &str| ScraperError::InvalidProfileUrl {
            handle: handle.to_string(),
            reason: reason.to_string(),
        };
        if handle.trim().is_empty() {
            return Err(invalid("handle is empty"));
        }
        let base = match platform {
            Platform::Tiktok => &self.tiktok_base_url,
            Platform::Youtube => &self.youtube_base_url,
        };
        let mut url = Url::parse(base).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("base URL cannot carry a path"))?
            .pop_if_empty()
            .push(&format!("@{handle}"));
        Ok(url)
    }

    /// Fetches the profile page HTML for `handle` on `platform`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidProfileUrl`]: the URL could not be built.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network, TLS or timeout failure.
    pub async fn fetch_profile_page(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<String, ScraperError> {
        let url = self.profile_url(platform, handle)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain: url.host_str().unwrap_or_default().to_string(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let html = response.text().await?;
                tracing::debug!(%url, bytes = html.len(), "profile page fetched");
                Ok(html)
            }
        })
        .await
    }
}
