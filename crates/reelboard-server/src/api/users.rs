use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use reelboard_store::create_user;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{map_store_error, present, required, ApiError, AppState};
use crate::calendars;
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct NewUserRequest {
    uid: Option<String>,
    #[serde(default, deserialize_with = "present")]
    preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct NewUserResponse {
    message: &'static str,
    uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FirstLoginRequest {
    user_id: Option<String>,
    user_data: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FirstLoginResponse {
    is_new_user: bool,
    data: Value,
}

/// `POST /api/newUser`: stores the preferences, then tries to generate the
/// first calendar. Calendar failures are logged and do not fail the request.
pub(super) async fn new_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<NewUserResponse>), ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required or preferences")?;
    let Some(preferences) = body.preferences else {
        return Err(ApiError::bad_request("UID is required or preferences"));
    };

    let now = Utc::now();
    create_user(state.store.as_ref(), uid, preferences, now)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to create user space"))?;
    tracing::info!(request_id = %req_id.0, uid, "user space created");

    match state.assistant.as_deref() {
        Some(assistant) => {
            if let Err(e) =
                calendars::regenerate(state.store.as_ref(), assistant, uid, now.date_naive()).await
            {
                tracing::error!(
                    request_id = %req_id.0,
                    uid,
                    error = %e,
                    "initial calendar generation failed"
                );
            }
        }
        None => tracing::warn!(
            request_id = %req_id.0,
            uid,
            "skipping initial calendar, no LLM configured"
        ),
    }

    Ok((
        StatusCode::CREATED,
        Json(NewUserResponse {
            message: "User space created successfully",
            uid: uid.to_string(),
        }),
    ))
}

/// `POST /api/firstLogin`
pub(super) async fn first_login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FirstLoginRequest>,
) -> Result<Json<FirstLoginResponse>, ApiError> {
    let uid = required(body.user_id.as_deref(), "userId is required")?;
    let outcome = reelboard_store::first_login(
        state.store.as_ref(),
        uid,
        body.user_data.unwrap_or(Value::Null),
        Utc::now(),
    )
    .await
    .map_err(|e| map_store_error(&req_id, &e, "Erro ao processar requisição"))?;

    Ok(Json(FirstLoginResponse {
        is_new_user: outcome.is_new_user,
        data: outcome.data,
    }))
}
