use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use reelboard_store::{chat_messages, create_chat, list_chats};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{assistant, map_store_error, required, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct NewChatRequest {
    uid: Option<String>,
    chat: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SaveChatRequest {
    uid: Option<String>,
    chat_id: Option<String>,
    title: Option<String>,
    messages: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChatRequest {
    uid: Option<String>,
    chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UidRequest {
    uid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScriptRequest {
    uid: Option<String>,
    chat_id: Option<String>,
    phrase: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewChatResponse {
    message: &'static str,
    chat_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatResponse {
    chat: Value,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatsResponse {
    chats: Vec<Value>,
}

/// `POST /api/newChat`
pub(super) async fn new_chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewChatRequest>,
) -> Result<Json<NewChatResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID and chat are required")?;
    let Some(Value::Object(chat)) = body.chat else {
        return Err(ApiError::bad_request("UID and chat are required"));
    };

    let chat_id = create_chat(state.store.as_ref(), uid, chat, Utc::now())
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to create chat"))?;
    tracing::info!(
        request_id = %req_id.0,
        uid,
        chat_id = %chat_id,
        "chat created"
    );

    Ok(Json(NewChatResponse {
        message: "Chat created successfully",
        chat_id,
    }))
}

/// `POST /api/saveChat`
pub(super) async fn save_chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SaveChatRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = "UID and chatId are required";
    let uid = required(body.uid.as_deref(), message)?;
    let chat_id = required(body.chat_id.as_deref(), message)?;

    reelboard_store::save_chat(
        state.store.as_ref(),
        uid,
        chat_id,
        body.title.as_deref(),
        body.messages,
        Utc::now(),
    )
    .await
    .map_err(|e| map_store_error(&req_id, &e, "Failed to save chat"))?;

    Ok(Json(MessageResponse {
        message: "Chat saved",
    }))
}

/// `POST /api/getChat`
pub(super) async fn get_chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = "UID and chatId are required";
    let uid = required(body.uid.as_deref(), message)?;
    let chat_id = required(body.chat_id.as_deref(), message)?;

    let chat = reelboard_store::get_chat(state.store.as_ref(), uid, chat_id)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to get chat"))?
        .ok_or_else(|| ApiError::not_found("Chat not found"))?;
    Ok(Json(ChatResponse { chat }))
}

/// `POST /api/getChats`: newest first.
pub(super) async fn get_chats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UidRequest>,
) -> Result<Json<ChatsResponse>, ApiError> {
    let uid = required(body.uid.as_deref(), "UID is required")?;
    let chats = list_chats(state.store.as_ref(), uid)
        .await
        .map_err(|e| map_store_error(&req_id, &e, "Failed to get chats"))?;
    Ok(Json(ChatsResponse { chats }))
}

/// `POST /api/generateScript`
///
/// Failures after validation answer `{success: false, error}` with 500.
pub(super) async fn generate_script(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScriptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = "UID, chatId and phrase are required";
    let uid = required(body.uid.as_deref(), message)?;
    let chat_id = required(body.chat_id.as_deref(), message)?;
    let phrase = required(body.phrase.as_deref(), message)?;

    let outcome = match assistant(&state) {
        Ok(assistant) => match chat_messages(state.store.as_ref(), uid, chat_id).await {
            Ok(history) => assistant
                .generate_script(&history, phrase)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        },
        Err(e) => Err(e.body.error),
    };

    Ok(match outcome {
        Ok(script) => (StatusCode::OK, Json(json!({"success": true, "data": script}))),
        Err(error) => {
            tracing::error!(
                request_id = %req_id.0,
                uid,
                chat_id,
                error = %error,
                "script generation failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": error})),
            )
        }
    })
}
