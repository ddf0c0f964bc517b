//! Output records of the stats pipeline.

use serde::{Deserialize, Serialize};

use crate::numeric::Magnitude;

/// Day labels used by the dashboard charts, Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// Warning attached to every response built from the fallback estimate.
pub const FALLBACK_WARNING: &str = "Using fallback data due to API error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub date: String,
    pub value: u64,
}

/// Seven zero-valued points, one per weekday label.
#[must_use]
pub fn zero_week() -> Vec<WeeklyPoint> {
    WEEKDAY_LABELS
        .iter()
        .map(|day| WeeklyPoint {
            date: (*day).to_string(),
            value: 0,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub image: Option<String>,
    pub description: String,
}

/// Normalized profile + metrics record returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetrics {
    pub username: String,
    pub followers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<u64>,
    pub likes: u64,
    pub videos: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digg_count: Option<u64>,
    pub comments: u64,
    pub views: u64,
    pub weekly_data: Vec<WeeklyPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The profile page could not be fetched (network error, non-2xx, timeout).
    FetchFailed,
    /// The page was fetched but no follower/subscriber count could be read.
    NoData,
}

/// Result of one stats request: the metrics plus whether they are estimated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub metrics: ProfileMetrics,
    pub fallback: Option<FallbackReason>,
}

impl StatsReport {
    #[must_use]
    pub fn live(metrics: ProfileMetrics) -> Self {
        Self {
            metrics,
            fallback: None,
        }
    }

    #[must_use]
    pub fn fallback(metrics: ProfileMetrics, reason: FallbackReason) -> Self {
        Self {
            metrics,
            fallback: Some(reason),
        }
    }

    #[must_use]
    pub fn warning(&self) -> Option<&'static str> {
        self.fallback.map(|_| FALLBACK_WARNING)
    }
}

/// Wire form: `{success, data, warning?, fallbackReason?}`.
impl Serialize for StatsReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Envelope<'a> {
            success: bool,
            data: &'a ProfileMetrics,
            #[serde(skip_serializing_if = "Option::is_none")]
            warning: Option<&'static str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            fallback_reason: Option<FallbackReason>,
        }

        Envelope {
            success: true,
            data: &self.metrics,
            warning: self.warning(),
            fallback_reason: self.fallback,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Subscribers,
    Views,
    Videos,
    Likes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactSource {
    MetadataParts,
    EmbeddedJson,
    Label,
}

/// One numeric fact read out of a profile document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedFact {
    pub kind: MetricKind,
    pub magnitude: Magnitude,
    pub source: FactSource,
}

impl ExtractedFact {
    #[must_use]
    pub fn count(&self) -> u64 {
        self.magnitude.to_count()
    }
}
