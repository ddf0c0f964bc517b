use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::CoreError;

/// Social platforms whose public profile pages the stats pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Youtube,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiktok" => Ok(Platform::Tiktok),
            "youtube" => Ok(Platform::Youtube),
            other => Err(CoreError::UnknownPlatform(other.to_string())),
        }
    }
}

/// The handles a user saved on the "views" configuration screen.
///
/// Stored verbatim under `users/{uid}/views`. Only `tiktok` and `youtube`
/// drive the stats pipeline; any other keys the UI writes are carried in
/// `extra` so a save/load cycle never drops them.
///
/// Handles are read leniently: numbers are taken as their decimal text and
/// any other non-string value counts as no handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(
        default,
        deserialize_with = "lenient_handle",
        skip_serializing_if = "Option::is_none"
    )]
    pub tiktok: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_handle",
        skip_serializing_if = "Option::is_none"
    )]
    pub youtube: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_handle<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl ViewsConfig {
    /// Saved handle for `platform`, ignoring blank entries.
    #[must_use]
    pub fn handle_for(&self, platform: Platform) -> Option<&str> {
        let handle = match platform {
            Platform::Tiktok => self.tiktok.as_deref(),
            Platform::Youtube => self.youtube.as_deref(),
        };
        handle.filter(|h| !h.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("TikTok".parse::<Platform>(), Ok(Platform::Tiktok));
        assert_eq!(" youtube ".parse::<Platform>(), Ok(Platform::Youtube));
    }

    #[test]
    fn platform_rejects_unknown_names() {
        assert_eq!(
            "instagram".parse::<Platform>(),
            Err(CoreError::UnknownPlatform("instagram".to_string()))
        );
    }

    #[test]
    fn views_config_keeps_unknown_keys() {
        let raw = serde_json::json!({"tiktok": "foo", "instagram": "bar"});
        let cfg: ViewsConfig = serde_json::from_value(raw.clone()).expect("deserialize");
        assert_eq!(cfg.handle_for(Platform::Tiktok), Some("foo"));
        assert_eq!(cfg.handle_for(Platform::Youtube), None);
        assert_eq!(serde_json::to_value(&cfg).expect("serialize"), raw);
    }

    #[test]
    fn views_config_reads_non_string_handles_leniently() {
        let raw = serde_json::json!({"tiktok": 42, "youtube": {"nested": true}});
        let cfg: ViewsConfig = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(cfg.handle_for(Platform::Tiktok), Some("42"));
        assert_eq!(cfg.handle_for(Platform::Youtube), None);
    }

    #[test]
    fn views_config_ignores_blank_handles() {
        let cfg = ViewsConfig {
            youtube: Some("   ".to_string()),
            ..ViewsConfig::default()
        };
        assert_eq!(cfg.handle_for(Platform::Youtube), None);
    }
}
