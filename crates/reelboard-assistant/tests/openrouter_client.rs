//! Integration tests for `OpenRouterClient` using `wiremock` as a stand-in
//! for the chat-completions endpoint.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reelboard_assistant::{AssistantError, EventColor, OpenRouterClient};

fn client_for(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::with_base_url("test-key", "test/model", 30, &format!("{}/api/v1", server.uri()))
        .expect("failed to build test OpenRouterClient")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
}

#[tokio::test]
async fn generate_calendar_forces_tool_and_parses_arguments() {
    let server = MockServer::start().await;
    let arguments = json!({
        "weeks": [{"day": "Segunda", "events": [
            {"id": 1, "title": "Bastidores", "time": "09:00", "color": "lime", "height": "h-40"}
        ]}],
        "expires": "2026-10-31"
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test/model",
            "tool_choice": {"type": "function", "function": {"name": "generate_calendar"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "generate_calendar", "arguments": arguments}
            }]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = client_for(&server)
        .generate_calendar(&json!({"preferences": {"niche": "fitness"}}), today())
        .await
        .unwrap();
    assert_eq!(plan.expires, "2026-10-31");
    assert_eq!(plan.weeks[0].events[0].title, "Bastidores");
    assert_eq!(plan.weeks[0].events[0].color, EventColor::Lime);
}

#[tokio::test]
async fn generate_calendar_without_tool_call_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Desculpe, não posso."}}]
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .generate_calendar(&json!({}), today())
        .await;
    assert!(matches!(result, Err(AssistantError::MissingToolCall { .. })));
}

#[tokio::test]
async fn api_error_carries_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {"message": "Insufficient credits", "code": 402}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_script(&[], "um vídeo sobre café")
        .await
        .unwrap_err();
    match err {
        AssistantError::Api { status, message } => {
            assert_eq!(status, 402);
            assert_eq!(message, "Insufficient credits");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_script_sends_history_and_returns_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "ideia"},
                {"role": "user", "content": "mais curto"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Título: Café em 30s"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![json!({"role": "user", "content": "ideia"})];
    let script = client_for(&server)
        .generate_script(&history, "mais curto")
        .await
        .unwrap();
    assert_eq!(script, "Título: Café em 30s");
}
