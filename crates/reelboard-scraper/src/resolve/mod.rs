//! Field resolution over parsed page JSON.
//!
//! Each field is read from a short list of candidate paths; the first path
//! that yields a non-empty value wins.

pub mod tiktok;
pub mod youtube;

use serde_json::Value;

pub use tiktok::{locate_user_info, resolve_tiktok_profile, TikTokProfile};
pub use youtube::{resolve_channel_fields, ChannelFields};

/// Non-empty string at `pointer` under `value`.
pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Text of a YouTube text node: `simpleText`, else the first run.
pub(crate) fn node_text(node: &Value) -> Option<&str> {
    str_at(node, "/simpleText").or_else(|| str_at(node, "/runs/0/text"))
}

/// All runs of a YouTube text node concatenated.
pub(crate) fn joined_runs(node: &Value) -> Option<String> {
    let runs = node.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    (!joined.trim().is_empty()).then_some(joined)
}
