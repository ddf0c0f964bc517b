use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::Utc;
use reelboard_assistant::{is_expired, WeekColumn};
use reelboard_store::{clear_calendar, get_user};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{assistant, map_store_error, required, ApiError, AppState};
use crate::calendars::{self, CalendarError};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct UidRequest {
    uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CalendarResponse {
    calendar: Value,
    calendar_expires: Option<String>,
    expired: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct RegeneratedResponse {
    message: &'static str,
    calendar: Vec<WeekColumn>,
}

fn map_calendar_error(req_id: &RequestId, error: CalendarError, message: &str) -> ApiError {
    match error {
        CalendarError::UserNotFound(_) => ApiError::not_found("User not found"),
        CalendarError::Store(e) => map_store_error(req_id, &e, message),
        other => {
            tracing::error!(request_id = %req_id.0, error = %other, "calendar generation failed");
            ApiError::internal(message).with_details(other.to_string())
        }
    }
}

/// `POST /api/makeCalendar`
pub(super) async fn make_calendar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UidRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let assistant = assistant(&state)?;

    calendars::regenerate(
        state.store.as_ref(),
        assistant,
        uid,
        Utc::now().date_naive(),
    )
    .await
    .map_err(|e| {
        map_calendar_error(
            &req_id,
            e,
            "Failed to generate calendar via LLM. Check server logs.",
        )
    })?;

    Ok(Json(MessageResponse {
        message: "Calendar generated and saved successfully",
    }))
}

/// `POST /api/getCalendar`
pub(super) async fn get_calendar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UidRequest>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let stored = reelboard_store::get_calendar(state.store.as_ref(), uid)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to fetch calendar"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let expired = is_expired(stored.calendar_expires.as_deref(), Utc::now().date_naive());
    Ok(Json(CalendarResponse {
        calendar: stored.calendar,
        calendar_expires: stored.calendar_expires,
        expired,
    }))
}

/// `POST /api/excludeCalendar`: drops the current calendar and generates a
/// replacement.
pub(super) async fn exclude_calendar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UidRequest>,
) -> Result<Json<RegeneratedResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let store = state.store.as_ref();

    get_user(store, uid)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to exclude calendar"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let assistant = assistant(&state)?;

    clear_calendar(store, uid)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to exclude calendar"))?;
    tracing::info!(request_id = %req_id.0, uid, "calendar excluded");

    let plan = calendars::regenerate(store, assistant, uid, Utc::now().date_naive())
        .await
        .map_err(|e| map_calendar_error(&req_id, e, "Failed to generate new calendar"))?;

    Ok(Json(RegeneratedResponse {
        message: "Calendar excluded and new calendar generated successfully",
        calendar: plan.weeks,
    }))
}
