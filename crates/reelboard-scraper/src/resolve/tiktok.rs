use serde_json::Value;

use super::str_at;

/// Counters and identity read from a TikTok `userInfo` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TikTokProfile {
    pub followers: u64,
    pub following: u64,
    pub hearts: u64,
    pub videos: u64,
    pub diggs: u64,
    pub nickname: Option<String>,
    pub unique_id: Option<String>,
    pub avatar: Option<String>,
    pub signature: String,
}

/// Finds the `userInfo` object inside the rehydration blob.
///
/// Prefers `__DEFAULT_SCOPE__["webapp.user-detail"].userInfo`; otherwise
/// takes the first scope entry that carries a `user` or `stats` member.
#[must_use]
pub fn locate_user_info(data: &Value) -> Option<&Value> {
    let scope = data.get("__DEFAULT_SCOPE__")?;
    if let Some(info) = scope
        .get("webapp.user-detail")
        .and_then(|detail| detail.get("userInfo"))
        .filter(|info| info.is_object())
    {
        return Some(info);
    }
    scope.as_object()?.values().find(|value| {
        value.is_object() && (truthy(value.get("user")) || truthy(value.get("stats")))
    })
}

#[must_use]
pub fn resolve_tiktok_profile(user_info: &Value) -> TikTokProfile {
    let empty = Value::Null;
    let user = user_info.get("user").unwrap_or(&empty);
    let stats = user_info
        .get("stats")
        .filter(|s| truthy(Some(s)))
        .or_else(|| user_info.get("statsV2"))
        .unwrap_or(&empty);

    let hearts = match to_count(stats.get("heartCount")) {
        0 => to_count(stats.get("heart")),
        n => n,
    };

    TikTokProfile {
        followers: to_count(stats.get("followerCount")),
        following: to_count(stats.get("followingCount")),
        hearts,
        videos: to_count(stats.get("videoCount")),
        diggs: to_count(stats.get("diggCount")),
        nickname: str_at(user, "/nickname").map(str::to_string),
        unique_id: str_at(user, "/uniqueId").map(str::to_string),
        avatar: str_at(user, "/avatarLarger")
            .or_else(|| str_at(user, "/avatarMedium"))
            .map(str::to_string),
        signature: str_at(user, "/signature").unwrap_or_default().to_string(),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Numbers are taken as-is (floored); strings are read by their leading
/// integer ("12.5K" reads as 12). Anything else is zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map_or(0, |f| f.floor() as u64)
        }),
        Some(Value::String(s)) => leading_integer(s),
        _ => 0,
    }
}

fn leading_integer(s: &str) -> u64 {
    let digits: String = s
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}
