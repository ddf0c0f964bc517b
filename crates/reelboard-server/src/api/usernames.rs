use axum::{
    extract::{Extension, State},
    Json,
};
use reelboard_store::{get_views, save_views};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{map_store_error, required, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct UidRequest {
    uid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveUsernamesRequest {
    uid: Option<String>,
    usernames: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct UsernamesResponse {
    usernames: Value,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageResponse {
    message: &'static str,
}

/// `POST /api/getUsernames`
pub(super) async fn get_usernames(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UidRequest>,
) -> Result<Json<UsernamesResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let usernames = get_views(state.store.as_ref(), uid)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to get usernames"))?
        .ok_or_else(|| ApiError::not_found("No usernames configured"))?;
    Ok(Json(UsernamesResponse { usernames }))
}

/// `POST /api/saveUsernames`: replaces the saved handles wholesale.
pub(super) async fn save_usernames(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SaveUsernamesRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let Some(Value::Object(usernames)) = body.usernames else {
        return Err(ApiError::bad_request("Usernames object is required"));
    };

    save_views(state.store.as_ref(), uid, usernames)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to save usernames"))?;
    tracing::info!(request_id = %req_id.0, uid, "usernames saved");
    Ok(Json(MessageResponse {
        message: "Usernames saved successfully",
    }))
}
