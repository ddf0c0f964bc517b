use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::response::Response;
use reelboard_scraper::ProfileClient;
use reelboard_store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

/// Router over `store`, with profile pages served by `pages` and the LLM
/// (when given) by `llm`.
fn app_with(store: Arc<dyn DocumentStore>, pages: &str, llm: Option<&str>) -> Router {
    let client = ProfileClient::new(5, "reelboard-test/0.1", 0, 0)
        .expect("profile client")
        .with_base_urls(pages, pages);
    let assistant = llm.map(|uri| {
        Arc::new(OpenRouterClient::with_base_url("test-key", "test/model", 30, uri).expect("llm client"))
    });
    let state = AppState {
        store,
        stats: Arc::new(StatsCollector::new(client)),
        assistant,
    };
    build_app(state, RateLimitState::new(1_000, Duration::from_secs(60)))
}

fn memory(tree: Value) -> Arc<dyn DocumentStore> {
    Arc::new(MemoryStore::with_tree(tree))
}

/// Pages host that refuses connections: every live fetch falls back.
const NO_PAGES: &str = "http://127.0.0.1:1";

async fn post(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json parse")
}

async fn mount_calendar_llm(server: &MockServer) {
    let arguments = json!({
        "weeks": [{"day": "Segunda", "events": [
            {"id": 1, "title": "Tutorial", "time": "18:00", "color": "blue", "height": "h-36"}
        ]}],
        "expires": "2099-01-14"
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"tool_calls": [{"type": "function", "function": {
                "name": "generate_calendar", "arguments": arguments
            }}]}}]
        })))
        .mount(server)
        .await;
}

#[test]
fn api_error_codes_map_to_status() {
    assert_eq!(
        ApiError::bad_request("x").into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ApiError::not_found("x").into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        ApiError::internal("x").into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn health_is_ok_and_echoes_request_id() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.to_str().unwrap()),
        Some("req-42")
    );
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn rate_limit_rejects_after_budget() {
    let state = AppState {
        store: memory(json!(null)),
        stats: Arc::new(StatsCollector::new(
            ProfileClient::new(5, "ua", 0, 0).expect("client"),
        )),
        assistant: None,
    };
    let app = build_app(state, RateLimitState::new(1, Duration::from_secs(60)));

    let first = post(app.clone(), "/api/getChats", json!({"uid": "u1"})).await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = post(app.clone(), "/api/getChats", json!({"uid": "u1"})).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    let health = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(health.status(), StatusCode::OK);
}

/// Store whose every call fails like an unreachable backend.
struct UnavailableStore;

#[async_trait::async_trait]
impl DocumentStore for UnavailableStore {
    async fn get(&self, path: &reelboard_store::DocPath) -> Result<Option<Value>, StoreError> {
        Err(unavailable(path))
    }
    async fn set(&self, path: &reelboard_store::DocPath, _: Value) -> Result<(), StoreError> {
        Err(unavailable(path))
    }
    async fn update(
        &self,
        path: &reelboard_store::DocPath,
        _: serde_json::Map<String, Value>,
    ) -> Result<(), StoreError> {
        Err(unavailable(path))
    }
    async fn remove(&self, path: &reelboard_store::DocPath) -> Result<(), StoreError> {
        Err(unavailable(path))
    }
    async fn child_keys(&self, path: &reelboard_store::DocPath) -> Result<Vec<String>, StoreError> {
        Err(unavailable(path))
    }
}

fn unavailable(path: &reelboard_store::DocPath) -> StoreError {
    StoreError::UnexpectedStatus {
        status: 503,
        url: path.to_string(),
    }
}

#[tokio::test]
async fn store_failure_is_500_with_details_and_keeps_request_id() {
    let app = app_with(Arc::new(UnavailableStore), NO_PAGES, None);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/getChats")
                .header("content-type", "application/json")
                .header("x-request-id", "req-7")
                .body(Body::from(json!({"uid": "u1"}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.to_str().unwrap()),
        Some("req-7")
    );
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to get chats");
    assert!(body["details"].as_str().unwrap().contains("503"));
}

// -------------------------------------------------------------------------
// makeStats
// -------------------------------------------------------------------------

#[tokio::test]
async fn make_stats_requires_uid_and_platform() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = post(app.clone(), "/api/makeStats", json!({"platform": "tiktok"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "UID is required");

    let response = post(app, "/api/makeStats", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn make_stats_without_views_is_404() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = post(app, "/api/makeStats", json!({"uid": "u1", "platform": "tiktok"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "User views not found");
}

#[tokio::test]
async fn make_stats_for_unsaved_platform_returns_handles() {
    let store = memory(json!({"users": {"u1": {"views": {"tiktok": "foo"}}}}));
    let app = app_with(store, NO_PAGES, None);

    let response = post(app.clone(), "/api/makeStats", json!({"uid": "u1", "platform": "youtube"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "data": {"tiktok": "foo"}})
    );

    let response = post(app, "/api/makeStats", json!({"uid": "u1", "platform": "instagram"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["tiktok"], "foo");
}

#[tokio::test]
async fn make_stats_unreachable_site_returns_fallback() {
    let store = memory(json!({"users": {"u1": {"views": {"tiktok": "foo"}}}}));
    let app = app_with(store, NO_PAGES, None);

    let response = post(app, "/api/makeStats", json!({"uid": "u1", "platform": "tiktok"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["warning"], "Using fallback data due to API error");
    assert_eq!(body["fallbackReason"], "fetch_failed");
    assert_eq!(body["data"]["username"], "foo");
    assert_eq!(body["data"]["followers"], 824);
    assert_eq!(body["data"]["weeklyData"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn make_stats_numeric_handle_still_returns_stats() {
    let store = memory(json!({"users": {"u1": {"views": {"tiktok": 42}}}}));
    let app = app_with(store, NO_PAGES, None);

    let response = post(app, "/api/makeStats", json!({"uid": "u1", "platform": "tiktok"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "42");
    assert_eq!(body["fallbackReason"], "fetch_failed");
}

#[tokio::test]
async fn make_stats_live_page_has_no_warning() {
    let server = MockServer::start().await;
    let blob = json!({"__DEFAULT_SCOPE__": {"webapp.user-detail": {"userInfo": {
        "user": {"nickname": "Foo", "signature": ""},
        "stats": {"followerCount": 5000, "heartCount": 700, "videoCount": 9}
    }}}});
    Mock::given(method("GET"))
        .and(path("/@foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">{blob}</script>"#
        )))
        .mount(&server)
        .await;

    let store = memory(json!({"users": {"u1": {"views": {"tiktok": "foo"}}}}));
    let app = app_with(store, &server.uri(), None);
    let body = json_body(post(app, "/api/makeStats", json!({"uid": "u1", "platform": "TikTok"})).await).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["followers"], 5000);
    assert_eq!(body["data"]["likes"], 700);
    assert!(body.get("warning").is_none());
    assert!(body.get("fallbackReason").is_none());
}

// -------------------------------------------------------------------------
// usernames
// -------------------------------------------------------------------------

#[tokio::test]
async fn usernames_round_trip_through_store() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);

    let missing = post(app.clone(), "/api/getUsernames", json!({"uid": "u1"})).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let saved = post(
        app.clone(),
        "/api/saveUsernames",
        json!({"uid": "u1", "usernames": {"tiktok": "foo", "youtube": "bar"}}),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);
    assert_eq!(json_body(saved).await["message"], "Usernames saved successfully");

    let found = post(app, "/api/getUsernames", json!({"uid": "u1"})).await;
    assert_eq!(
        json_body(found).await,
        json!({"usernames": {"tiktok": "foo", "youtube": "bar"}})
    );
}

#[tokio::test]
async fn save_usernames_rejects_non_object() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = post(app, "/api/saveUsernames", json!({"uid": "u1", "usernames": "foo"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Usernames object is required");
}

#[tokio::test]
async fn uid_with_path_separator_is_rejected() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = post(app, "/api/getUsernames", json!({"uid": "u1/../u2"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -------------------------------------------------------------------------
// users
// -------------------------------------------------------------------------

#[tokio::test]
async fn new_user_is_created_even_without_llm() {
    let store = memory(json!(null));
    let app = app_with(Arc::clone(&store), NO_PAGES, None);

    let response = post(
        app,
        "/api/newUser",
        json!({"uid": "u1", "preferences": {"niche": "games"}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({"message": "User space created successfully", "uid": "u1"})
    );

    let user = reelboard_store::get_user(store.as_ref(), "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user["preferences"]["niche"], "games");
    assert!(user["createdAt"].is_string());
}

#[tokio::test]
async fn new_user_generates_first_calendar() {
    let llm = MockServer::start().await;
    mount_calendar_llm(&llm).await;
    let store = memory(json!(null));
    let app = app_with(Arc::clone(&store), NO_PAGES, Some(&llm.uri()));

    let response = post(app, "/api/newUser", json!({"uid": "u1", "preferences": {}})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = reelboard_store::get_calendar(store.as_ref(), "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.calendar_expires.as_deref(), Some("2099-01-14"));
}

#[tokio::test]
async fn new_user_requires_preferences_field() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = post(app.clone(), "/api/newUser", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // explicit null is accepted and stored as empty preferences
    let response = post(app, "/api/newUser", json!({"uid": "u1", "preferences": null})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn first_login_creates_then_returns_existing() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);

    let first = json_body(
        post(
            app.clone(),
            "/api/firstLogin",
            json!({"userId": "u1", "userData": {"email": "a@b.c"}}),
        )
        .await,
    )
    .await;
    assert_eq!(first, json!({"isNewUser": true, "data": {"email": "a@b.c"}}));

    let second = json_body(
        post(
            app,
            "/api/firstLogin",
            json!({"userId": "u1", "userData": {"email": "other"}}),
        )
        .await,
    )
    .await;
    assert_eq!(second["isNewUser"], false);
    assert_eq!(second["data"]["email"], "a@b.c");
    assert!(second["data"]["createdAt"].is_string());
}

// -------------------------------------------------------------------------
// calendar
// -------------------------------------------------------------------------

#[tokio::test]
async fn get_calendar_reports_expiry() {
    let store = memory(json!({"users": {
        "old": {"calendar": [{"day": "Seg"}], "calendarExpires": "2000-01-01"},
        "empty": {"preferences": {"niche": "x"}}
    }}));
    let app = app_with(store, NO_PAGES, None);

    let old = json_body(post(app.clone(), "/api/getCalendar", json!({"uid": "old"})).await).await;
    assert_eq!(old["calendar"], json!([{"day": "Seg"}]));
    assert_eq!(old["calendarExpires"], "2000-01-01");
    assert_eq!(old["expired"], true);

    let empty = json_body(post(app.clone(), "/api/getCalendar", json!({"uid": "empty"})).await).await;
    assert_eq!(empty, json!({"calendar": [], "calendarExpires": null, "expired": true}));

    let missing = post(app, "/api/getCalendar", json!({"uid": "ghost"})).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn make_calendar_without_llm_is_500() {
    let store = memory(json!({"users": {"u1": {"preferences": {"niche": "x"}}}}));
    let app = app_with(store, NO_PAGES, None);
    let response = post(app, "/api/makeCalendar", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn make_calendar_for_unknown_user_is_404() {
    let llm = MockServer::start().await;
    mount_calendar_llm(&llm).await;
    let app = app_with(memory(json!(null)), NO_PAGES, Some(&llm.uri()));
    let response = post(app, "/api/makeCalendar", json!({"uid": "ghost"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn make_calendar_stores_generated_weeks() {
    let llm = MockServer::start().await;
    mount_calendar_llm(&llm).await;
    let store = memory(json!({"users": {"u1": {"preferences": {"niche": "x"}}}}));
    let app = app_with(Arc::clone(&store), NO_PAGES, Some(&llm.uri()));

    let response = post(app.clone(), "/api/makeCalendar", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["message"],
        "Calendar generated and saved successfully"
    );

    let body = json_body(post(app, "/api/getCalendar", json!({"uid": "u1"})).await).await;
    assert_eq!(body["calendar"][0]["events"][0]["title"], "Tutorial");
    assert_eq!(body["calendarExpires"], "2099-01-14");
    assert_eq!(body["expired"], false);
}

#[tokio::test]
async fn make_calendar_llm_failure_is_500() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "sem ferramenta"}}]
        })))
        .mount(&llm)
        .await;
    let store = memory(json!({"users": {"u1": {"preferences": {"niche": "x"}}}}));
    let app = app_with(store, NO_PAGES, Some(&llm.uri()));

    let response = post(app, "/api/makeCalendar", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["error"],
        "Failed to generate calendar via LLM. Check server logs."
    );
}

#[tokio::test]
async fn exclude_calendar_replaces_and_returns_new_weeks() {
    let llm = MockServer::start().await;
    mount_calendar_llm(&llm).await;
    let store = memory(json!({"users": {"u1": {
        "preferences": {"niche": "x"},
        "calendar": [{"day": "Antigo"}],
        "calendarExpires": "2000-01-01"
    }}}));
    let app = app_with(store, NO_PAGES, Some(&llm.uri()));

    let response = post(app.clone(), "/api/excludeCalendar", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["calendar"][0]["day"], "Segunda");

    let missing = post(app, "/api/excludeCalendar", json!({"uid": "ghost"})).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// -------------------------------------------------------------------------
// chats
// -------------------------------------------------------------------------

#[tokio::test]
async fn chat_lifecycle() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);

    let created = json_body(
        post(
            app.clone(),
            "/api/newChat",
            json!({"uid": "u1", "chat": {"title": "Ideias"}}),
        )
        .await,
    )
    .await;
    assert_eq!(created["message"], "Chat created successfully");
    let chat_id = created["chatId"].as_str().expect("chatId").to_string();

    let saved = post(
        app.clone(),
        "/api/saveChat",
        json!({"uid": "u1", "chatId": chat_id, "messages": [{"role": "user", "content": "oi"}]}),
    )
    .await;
    assert_eq!(json_body(saved).await, json!({"message": "Chat saved"}));

    let chat = json_body(
        post(app.clone(), "/api/getChat", json!({"uid": "u1", "chatId": chat_id})).await,
    )
    .await;
    assert_eq!(chat["chat"]["id"], chat_id.as_str());
    assert_eq!(chat["chat"]["title"], "Sem título");
    assert_eq!(chat["chat"]["messages"][0]["content"], "oi");

    let chats = json_body(post(app, "/api/getChats", json!({"uid": "u1"})).await).await;
    assert_eq!(chats["chats"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn chat_validation_and_not_found() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);

    let response = post(app.clone(), "/api/newChat", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(app.clone(), "/api/saveChat", json!({"uid": "u1"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(app.clone(), "/api/getChat", json!({"uid": "u1", "chatId": "nope"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let chats = json_body(post(app, "/api/getChats", json!({"uid": "u1"})).await).await;
    assert_eq!(chats, json!({"chats": []}));
}

#[tokio::test]
async fn generate_script_returns_model_text() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Título: Receita rápida"}}]
        })))
        .mount(&llm)
        .await;
    let store = memory(json!({"users": {"u1": {"chats": {"c1": {
        "title": "t", "messages": [{"role": "user", "content": "receita"}]
    }}}}}));
    let app = app_with(store, NO_PAGES, Some(&llm.uri()));

    let response = post(
        app,
        "/api/generateScript",
        json!({"uid": "u1", "chatId": "c1", "phrase": "versão curta"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"success": true, "data": "Título: Receita rápida"})
    );
}

#[tokio::test]
async fn generate_script_failure_is_success_false() {
    let app = app_with(memory(json!(null)), NO_PAGES, None);
    let response = post(
        app,
        "/api/generateScript",
        json!({"uid": "u1", "chatId": "c1", "phrase": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}
