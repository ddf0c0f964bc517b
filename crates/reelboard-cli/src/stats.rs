//! Stats pipeline command handlers.

use std::path::Path;

use anyhow::Context;
use reelboard_core::{AppConfig, Platform};
use reelboard_scraper::{assemble, ExtractionFailure, ProfileClient, StatsCollector};

/// Runs the full pipeline, fallback included, and prints the response JSON.
pub(crate) async fn run_stats(
    config: &AppConfig,
    platform: Platform,
    handle: &str,
) -> anyhow::Result<()> {
    let client = ProfileClient::new(
        config.stats_request_timeout_secs,
        &config.stats_user_agent,
        config.stats_max_retries,
        config.stats_retry_backoff_base_secs,
    )?
    .with_base_urls(&config.tiktok_base_url, &config.youtube_base_url);

    let report = StatsCollector::new(client).collect(platform, handle).await;
    if let Some(warning) = report.warning() {
        eprintln!("warning: {warning}");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Extraction only: prints the metrics, or fails when the page holds no
/// primary metric. No fallback estimate is substituted.
pub(crate) fn run_extract(platform: Platform, handle: &str, file: &Path) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    tracing::info!(platform = %platform, handle, bytes = html.len(), "extracting saved page");

    match assemble(platform, handle, &html) {
        Ok(metrics) => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
        Err(ExtractionFailure::NoPrimaryMetric) => {
            anyhow::bail!("no follower or subscriber count found in {}", file.display())
        }
        Err(e) => Err(e.into()),
    }
}
