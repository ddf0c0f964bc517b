//! Turns a fetched profile page into a [`ProfileMetrics`] record, falling
//! back to the per-handle estimate whenever live data is unavailable.

use std::sync::LazyLock;

use reelboard_core::Platform;

use crate::client::ProfileClient;
use crate::embedded::{EmbeddedLocator, ScriptById};
use crate::error::ExtractionFailure;
use crate::fallback::fallback_metrics;
use crate::metadata::{extract_metadata_facts, total_likes};
use crate::numeric::parse_count_text;
use crate::resolve::{locate_user_info, resolve_channel_fields, resolve_tiktok_profile};
use crate::types::{
    zero_week, ExtractedFact, FactSource, FallbackReason, MetricKind, ProfileMetrics,
    ProfileSummary, StatsReport,
};

static TIKTOK_DATA: LazyLock<ScriptById> = LazyLock::new(|| {
    ScriptById::new("__UNIVERSAL_DATA_FOR_REHYDRATION__").expect("valid regex")
});
static YOUTUBE_DATA: LazyLock<EmbeddedLocator> =
    LazyLock::new(|| EmbeddedLocator::new("ytInitialData").expect("valid regex"));

pub struct StatsCollector {
    client: ProfileClient,
}

impl StatsCollector {
    #[must_use]
    pub fn new(client: ProfileClient) -> Self {
        Self { client }
    }

    /// Live metrics for `handle`, or the fallback estimate.
    ///
    /// Never fails: fetch and extraction problems are logged and reported
    /// through [`StatsReport::fallback`].
    pub async fn collect(&self, platform: Platform, handle: &str) -> StatsReport {
        match self.try_collect(platform, handle).await {
            Ok(metrics) => StatsReport::live(metrics),
            Err(failure) => {
                let reason = match failure {
                    ExtractionFailure::Fetch(_) => FallbackReason::FetchFailed,
                    ExtractionFailure::NoPrimaryMetric => FallbackReason::NoData,
                };
                tracing::warn!(
                    platform = %platform,
                    handle,
                    error = %failure,
                    "live stats unavailable, using fallback estimate"
                );
                StatsReport::fallback(fallback_metrics(platform, handle), reason)
            }
        }
    }

    /// Fetches and extracts live metrics without any fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionFailure::Fetch`] if the page could not be fetched
    /// and [`ExtractionFailure::NoPrimaryMetric`] if it held no follower count.
    pub async fn try_collect(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<ProfileMetrics, ExtractionFailure> {
        let html = self.client.fetch_profile_page(platform, handle).await?;
        assemble(platform, handle, &html)
    }
}

/// Extracts live metrics from an already-fetched profile page.
///
/// # Errors
///
/// Returns [`ExtractionFailure::NoPrimaryMetric`] when the follower or
/// subscriber count is missing or zero.
pub fn assemble(
    platform: Platform,
    handle: &str,
    html: &str,
) -> Result<ProfileMetrics, ExtractionFailure> {
    match platform {
        Platform::Tiktok => assemble_tiktok(handle, html),
        Platform::Youtube => assemble_youtube(handle, html),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled(base: u64, ratio: f64) -> u64 {
    (base as f64 * ratio).floor() as u64
}

fn assemble_tiktok(handle: &str, html: &str) -> Result<ProfileMetrics, ExtractionFailure> {
    let Some(data) = TIKTOK_DATA.parse(html) else {
        tracing::debug!(handle, "tiktok rehydration script not found");
        return Err(ExtractionFailure::NoPrimaryMetric);
    };
    let Some(user_info) = locate_user_info(&data) else {
        tracing::debug!(handle, "tiktok userInfo not found");
        return Err(ExtractionFailure::NoPrimaryMetric);
    };

    let profile = resolve_tiktok_profile(user_info);
    if profile.followers == 0 {
        return Err(ExtractionFailure::NoPrimaryMetric);
    }

    let name = profile
        .nickname
        .clone()
        .or_else(|| profile.unique_id.clone())
        .unwrap_or_else(|| handle.to_string());

    Ok(ProfileMetrics {
        username: handle.to_string(),
        followers: profile.followers,
        following: Some(profile.following),
        likes: profile.hearts,
        videos: profile.videos,
        digg_count: Some(profile.diggs),
        comments: scaled(profile.followers, 0.01),
        views: scaled(profile.followers, 0.5),
        weekly_data: zero_week(),
        profile: Some(ProfileSummary {
            name,
            image: profile.avatar,
            description: profile.signature,
        }),
    })
}

fn json_fact(kind: MetricKind, text: Option<&str>) -> Option<ExtractedFact> {
    let magnitude = parse_count_text(text?)?;
    Some(ExtractedFact {
        kind,
        magnitude,
        source: FactSource::EmbeddedJson,
    })
}

fn assemble_youtube(handle: &str, html: &str) -> Result<ProfileMetrics, ExtractionFailure> {
    let likes_total = total_likes(html);
    let scanned = extract_metadata_facts(html);
    let channel = YOUTUBE_DATA
        .locate(html)
        .map(|data| resolve_channel_fields(&data))
        .unwrap_or_default();

    // Embedded JSON values take precedence over the metadata scans.
    let pick = |json: Option<ExtractedFact>, scanned: Option<ExtractedFact>| {
        json.or(scanned).map_or(0, |fact| {
            tracing::debug!(kind = ?fact.kind, source = ?fact.source, count = fact.count(), "youtube fact");
            fact.count()
        })
    };
    let subscribers = pick(
        json_fact(MetricKind::Subscribers, channel.subscriber_text.as_deref()),
        scanned.subscribers,
    );
    let total_views = pick(
        json_fact(MetricKind::Views, channel.view_count_text.as_deref()),
        scanned.views,
    );
    let videos = pick(
        json_fact(MetricKind::Videos, channel.video_count_text.as_deref()),
        scanned.videos,
    );

    if subscribers == 0 {
        return Err(ExtractionFailure::NoPrimaryMetric);
    }

    let avg_likes = if likes_total > 0 && videos > 0 {
        likes_total / videos
    } else if videos > 0 {
        scaled(subscribers, 0.05) / videos
    } else {
        scaled(subscribers, 0.05)
    };
    let views = if videos > 0 {
        total_views / videos
    } else {
        subscribers.saturating_mul(50)
    };

    Ok(ProfileMetrics {
        username: handle.to_string(),
        followers: subscribers,
        following: None,
        likes: if likes_total > 0 { likes_total } else { avg_likes },
        videos,
        digg_count: None,
        comments: scaled(subscribers, 0.01),
        views,
        weekly_data: zero_week(),
        profile: Some(ProfileSummary {
            name: channel.title.unwrap_or_else(|| handle.to_string()),
            image: channel.avatar_url,
            description: channel.description.unwrap_or_default(),
        }),
    })
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
