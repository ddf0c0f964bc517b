//! Retry with exponential backoff for profile-page fetches.
//!
//! Only transient failures are retried. A 404 or a 403 from a platform
//! will not change on a second try and is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`] for timeouts, refused connections and 5xx.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::InvalidProfileUrl { .. } => false,
    }
}

/// Wait before retry `attempt` (1-based): `backoff_base_secs * 2^(attempt-1)`
/// with ±25% jitter, never shorter than a 429's `Retry-After`, capped at 60 s.
fn backoff_delay(err: &ScraperError, attempt: u32, backoff_base_secs: u64) -> Duration {
    let computed = backoff_base_secs
        .saturating_mul(1_000)
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    let floor = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    Duration::from_millis(jittered.max(floor).min(MAX_DELAY_MS))
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra
/// times with [`backoff_delay`] between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }
        attempt += 1;

        let delay = backoff_delay(&err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(MAX_DELAY_MS),
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}
