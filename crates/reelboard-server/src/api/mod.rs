mod calendar;
mod chats;
mod stats;
mod usernames;
mod users;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use reelboard_assistant::OpenRouterClient;
use reelboard_scraper::StatsCollector;
use reelboard_store::{DocumentStore, StoreError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub stats: Arc<StatsCollector>,
    /// `None` when no `OpenRouter` key is configured.
    pub assistant: Option<Arc<OpenRouterClient>>,
}

/// Error response: `{ "error": ..., "details"?: ... }`.
#[derive(Debug)]
pub struct ApiError {
    code: &'static str,
    body: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    fn status(&self) -> StatusCode {
        match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.body)).into_response()
    }
}

/// A non-empty string field, or a 400 with `message`.
pub(super) fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

/// Invalid keys are the caller's fault; anything else is a store failure.
pub(super) fn map_store_error(
    req_id: &RequestId,
    error: &StoreError,
    message: &str,
) -> ApiError {
    match error {
        StoreError::InvalidKey { .. } | StoreError::InvalidPath { .. } => {
            ApiError::bad_request(error.to_string())
        }
        _ => {
            tracing::error!(
                request_id = %req_id.0,
                error = %error,
                "document store request failed"
            );
            ApiError::internal(message).with_details(error.to_string())
        }
    }
}

pub(super) fn assistant(state: &AppState) -> Result<&OpenRouterClient, ApiError> {
    state
        .assistant
        .as_deref()
        .ok_or_else(|| ApiError::internal("OpenRouter API key is not configured"))
}

/// Distinguishes a field sent as `null` (`Some(Value::Null)`) from one
/// that is absent (`None`). Use with `#[serde(default)]`.
pub(super) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/makeStats", post(stats::make_stats))
        .route("/api/getUsernames", post(usernames::get_usernames))
        .route("/api/saveUsernames", post(usernames::save_usernames))
        .route("/api/newUser", post(users::new_user))
        .route("/api/firstLogin", post(users::first_login))
        .route("/api/makeCalendar", post(calendar::make_calendar))
        .route("/api/getCalendar", post(calendar::get_calendar))
        .route("/api/excludeCalendar", post(calendar::exclude_calendar))
        .route("/api/newChat", post(chats::new_chat))
        .route("/api/saveChat", post(chats::save_chat))
        .route("/api/getChat", post(chats::get_chat))
        .route("/api/getChats", post(chats::get_chats))
        .route("/api/generateScript", post(chats::generate_script))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
