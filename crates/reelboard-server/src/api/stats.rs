use axum::{
    extract::{Extension, State},
    Json,
};
use reelboard_core::Platform;
use reelboard_scraper::StatsReport;
use reelboard_store::get_views_config;
use serde::{Deserialize, Serialize};

use super::{map_store_error, required, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct StatsRequest {
    uid: Option<String>,
    platform: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum StatsResponse {
    Report(StatsReport),
    Handles(HandlesBody),
}

#[derive(Debug, Serialize)]
pub(super) struct HandlesBody {
    success: bool,
    data: Handles,
}

#[derive(Debug, Serialize)]
pub(super) struct Handles {
    #[serde(skip_serializing_if = "Option::is_none")]
    tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    youtube: Option<String>,
}

/// `POST /api/makeStats`
///
/// Always 200 once the saved handles are loaded: live metrics, the fallback
/// estimate, or just the handles when `platform` has none saved.
pub(super) async fn make_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<StatsRequest>,
) -> Result<Json<StatsResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let platform = required(body.platform.as_deref(), "Platform is required")?;

    let views = get_views_config(state.store.as_ref(), uid)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to fetch MakeStats"))?
        .ok_or_else(|| ApiError::not_found("User views not found"))?;

    let target = platform
        .parse::<Platform>()
        .ok()
        .and_then(|p| views.handle_for(p).map(|handle| (p, handle)));

    let Some((platform, handle)) = target else {
        tracing::info!(
            request_id = %req_id.0,
            uid,
            platform,
            "no saved handle for platform, returning handles"
        );
        return Ok(Json(StatsResponse::Handles(HandlesBody {
            success: true,
            data: Handles {
                tiktok: views.tiktok.clone(),
                youtube: views.youtube.clone(),
            },
        })));
    };

    let report = state.stats.collect(platform, handle).await;
    tracing::info!(
        request_id = %req_id.0,
        uid,
        platform = %platform,
        handle,
        fallback = report.fallback.is_some(),
        "stats collected"
    );
    Ok(Json(StatsResponse::Report(report)))
}
