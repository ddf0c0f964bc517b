//! Deterministic per-handle estimates used when live extraction fails.
//!
//! The same handle always maps to the same counts; only the weekly curve
//! carries random jitter.

use reelboard_core::Platform;

use crate::types::{ProfileMetrics, ProfileSummary, WeeklyPoint, WEEKDAY_LABELS};

/// Sum of the UTF-16 code units of `handle`.
#[must_use]
pub fn handle_hash(handle: &str) -> u64 {
    handle.encode_utf16().map(u64::from).sum()
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled(base: u64, ratio: f64) -> u64 {
    (base as f64 * ratio).floor() as u64
}

/// Counts derived from the handle hash, with an all-zero weekly series.
#[must_use]
pub fn estimate(platform: Platform, handle: &str) -> ProfileMetrics {
    let hash = handle_hash(handle);
    let profile = Some(ProfileSummary {
        name: handle.to_string(),
        image: None,
        description: String::new(),
    });

    match platform {
        Platform::Tiktok => {
            let followers = 500 + hash % 100_000;
            let likes = scaled(followers, 0.08);
            ProfileMetrics {
                username: handle.to_string(),
                followers,
                following: Some(scaled(followers, 0.1)),
                likes,
                videos: scaled(followers, 0.15),
                digg_count: Some(scaled(likes, 0.5)),
                comments: scaled(followers, 0.01),
                views: scaled(followers, 0.5),
                weekly_data: crate::types::zero_week(),
                profile,
            }
        }
        Platform::Youtube => {
            let subscribers = 1_000 + hash % 100_000;
            ProfileMetrics {
                username: handle.to_string(),
                followers: subscribers,
                following: None,
                likes: scaled(subscribers, 0.05),
                videos: scaled(subscribers, 0.1),
                digg_count: None,
                comments: scaled(subscribers, 0.01),
                views: subscribers * 50,
                weekly_data: crate::types::zero_week(),
                profile,
            }
        }
    }
}

/// Weekday weight: midweek peaks, weekend dips.
fn day_weight(index: usize) -> f64 {
    match index {
        2..=4 => 1.4,
        0 | 6 => 0.7,
        _ => 1.0,
    }
}

/// Seven-point curve around `base`, each point scaled by its weekday weight
/// and by a jitter factor drawn from `jitter`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn weekly_curve<F>(base: u64, mut jitter: F) -> Vec<WeeklyPoint>
where
    F: FnMut() -> f64,
{
    WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let value = (base as f64 * day_weight(i) * jitter()).floor();
            WeeklyPoint {
                date: (*day).to_string(),
                value: if value.is_finite() && value > 0.0 {
                    value as u64
                } else {
                    0
                },
            }
        })
        .collect()
}

/// Uniform jitter in `[0.75, 1.25)`.
fn random_jitter() -> f64 {
    rand::random::<f64>() * 0.5 + 0.75
}

/// The full fallback record: [`estimate`] plus a jittered weekly curve
/// based on likes + comments.
#[must_use]
pub fn fallback_metrics(platform: Platform, handle: &str) -> ProfileMetrics {
    let mut metrics = estimate(platform, handle);
    let base = metrics.likes + metrics.comments;
    metrics.weekly_data = weekly_curve(base, random_jitter);
    metrics
}
