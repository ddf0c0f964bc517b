//! Regex scans over raw YouTube channel HTML.
//!
//! These run before (and independently of) the embedded-JSON resolver so a
//! page whose `ytInitialData` blob is missing or malformed can still yield
//! subscriber, view and video counts.

use std::sync::LazyLock;

use regex::Regex;

use crate::numeric::parse_metric_phrase;
use crate::types::{ExtractedFact, FactSource, MetricKind};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
}

// Each list is tried in order; the first capture that parses wins.
static SUBSCRIBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(?i)"metadataParts"\s*:\s*\[[^\]]*"text"\s*:\s*\{\s*"content"\s*:\s*"([^"]*(?:[\d.,]+\s*[MK]?\s*subscribers?)[^"]*)""#,
        r#"(?i)"content"\s*:\s*"([^"]*(?:[\d.,]+\s*[MK]?\s*subscribers?)[^"]*)""#,
    ])
});
static VIEW_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(?i)"metadataParts"\s*:\s*\[[^\]]*"text"\s*:\s*\{\s*"content"\s*:\s*"([^"]*(?:[\d.,]+\s*[MK]?\s*(?:total\s*)?(?:views?|visualizações))[^"]*)""#,
        r#"(?i)"content"\s*:\s*"([^"]*(?:[\d.,]+\s*[MK]?\s*(?:total\s*)?(?:views?|visualizações))[^"]*)""#,
    ])
});
static VIDEO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(?i)"metadataParts"\s*:\s*\[[^\]]*"text"\s*:\s*\{\s*"content"\s*:\s*"([^"]*(?:[\d.,]+\s*[MK]?\s*(?:videos?|vídeos))[^"]*)""#,
        r#"(?i)"content"\s*:\s*"([^"]*(?:[\d.,]+\s*[MK]?\s*(?:videos?|vídeos))[^"]*)""#,
    ])
});
static LIKE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(?i)"label"\s*:\s*"([^"]*(?:[\d.,]+)\s*(?:likes?|curtidas?)[^"]*)""#,
        r#"(?i)label\s*:\s*"?([^"}\]]*(?:[\d.,]+)\s*(?:likes?|curtidas?)[^"}\]]*)"?"#,
        r#"(?i)"label"\s*:\s*\{\s*[^}]*"content"\s*:\s*"([^"]*(?:[\d.,]+)\s*(?:likes?|curtidas?)[^"]*)""#,
        r#"(?i)"simpleText"\s*:\s*"([^"]*(?:[\d.,]+)\s*(?:likes?|curtidas?)[^"]*)""#,
    ])
});

/// Subscriber, view and video counts found by the metadata scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFacts {
    pub subscribers: Option<ExtractedFact>,
    pub views: Option<ExtractedFact>,
    pub videos: Option<ExtractedFact>,
}

#[must_use]
pub fn extract_metadata_facts(html: &str) -> MetadataFacts {
    MetadataFacts {
        subscribers: first_fact(html, &SUBSCRIBER_PATTERNS, MetricKind::Subscribers),
        views: first_fact(html, &VIEW_PATTERNS, MetricKind::Views),
        videos: first_fact(html, &VIDEO_PATTERNS, MetricKind::Videos),
    }
}

fn first_fact(html: &str, patterns: &[Regex], kind: MetricKind) -> Option<ExtractedFact> {
    patterns.iter().find_map(|re| {
        re.captures_iter(html).find_map(|caps| {
            let text = caps.get(1)?.as_str();
            parse_metric_phrase(kind, text).map(|magnitude| ExtractedFact {
                kind,
                magnitude,
                source: FactSource::MetadataParts,
            })
        })
    })
}

/// Every like-count label on the page, across all label patterns.
#[must_use]
pub fn extract_like_facts(html: &str) -> Vec<ExtractedFact> {
    LIKE_PATTERNS
        .iter()
        .flat_map(|re| re.captures_iter(html))
        .filter_map(|caps| {
            let text = caps.get(1)?.as_str();
            parse_metric_phrase(MetricKind::Likes, text).map(|magnitude| ExtractedFact {
                kind: MetricKind::Likes,
                magnitude,
                source: FactSource::Label,
            })
        })
        .collect()
}

/// Sum of all like counts visible on the page (the video grid's labels).
#[must_use]
pub fn total_likes(html: &str) -> u64 {
    extract_like_facts(html)
        .iter()
        .map(ExtractedFact::count)
        .fold(0u64, u64::saturating_add)
}
