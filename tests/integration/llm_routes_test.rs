//! Raw Provider Route Tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{
    app, app_with, config_for, gemini_completion, get, openai_completion, post, send,
    GEMINI_GENERATE_PATH, OPENAI_PATH,
};

#[tokio::test]
async fn test_openai_route_buffered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(header("authorization", "Bearer sk-openai-test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4", "max_tokens": 64 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/llm/openai",
        json!({
            "messages": [{ "role": "user", "content": "Say hello" }],
            "model": "gpt-4",
            "max_tokens": 64
        }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["content"], "Hello!");
    assert_eq!(response.body["usage"]["prompt_tokens"], 120);
}

#[tokio::test]
async fn test_openai_route_requires_messages() {
    let server = MockServer::start().await;
    let app = app(&server);
    let response = post(&app, "/api/llm/openai", json!({ "messages": [] })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");
}

#[tokio::test]
async fn test_openai_route_streams_passthrough() {
    let server = MockServer::start().await;
    let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/llm/openai",
        json!({ "messages": [{ "role": "user", "content": "Hi" }], "stream": true }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("text/event-stream"));
    assert_eq!(response.raw, sse);
}

#[tokio::test]
async fn test_openai_route_stream_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/llm/openai",
        json!({ "messages": [{ "role": "user", "content": "Hi" }], "stream": true }),
    )
    .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["code"], "upstream_error");
    assert_eq!(response.body["details"]["upstreamStatus"], 503);
}

#[tokio::test]
async fn test_gemini_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_GENERATE_PATH))
        .and(query_param("key", "gm-test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Write a haiku" }] }],
            "generationConfig": { "maxOutputTokens": 100 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_completion("Autumn moon")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/llm/gemini",
        json!({ "prompt": "Write a haiku", "maxOutputTokens": 100 }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["content"], "Autumn moon");
    assert_eq!(response.body["model"], "gemini-pro");
    assert_eq!(response.body["usage"]["total_tokens"], 75);
}

#[tokio::test]
async fn test_gemini_route_missing_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app_with(config_for(&server, Some("sk-openai-test-key"), None));
    let response = post(&app, "/api/llm/gemini", json!({ "prompt": "Hi" })).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "Gemini API key not configured");
}

#[tokio::test]
async fn test_gemini_route_rejects_path_like_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/llm/gemini",
        json!({ "prompt": "Hi", "model": "../../foo" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "provider_bad_request");
}

#[tokio::test]
async fn test_status_masks_keys() {
    let server = MockServer::start().await;
    let app = app_with(config_for(&server, Some("sk-openai-test-key"), None));

    let response = send(&app, Method::GET, "/api/llm/status", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["openai"]["configured"], true);
    assert_eq!(response.body["openai"]["keyPrefix"], "sk-ope...");
    assert_eq!(response.body["openai"]["keyLength"], 18);
    assert_eq!(response.body["gemini"]["configured"], false);
    assert_eq!(response.body["defaultProvider"], "openai");
    assert!(!response.raw.contains("sk-openai-test-key"));
}

#[tokio::test]
async fn test_connection_test_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(body_partial_json(json!({ "max_tokens": 50, "temperature": 0.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("TEST_SUCCESS")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = send(&app, Method::POST, "/api/llm/test", None, Some(super::support::USER)).await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["provider"], "openai");
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["response"], "TEST_SUCCESS");
}

#[tokio::test]
async fn test_health_reports_providers() {
    let server = MockServer::start().await;
    let app = app_with(config_for(&server, None, Some("gm-test-key")));

    let response = get(&app, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["service"], "promptbook-server");
    assert_eq!(response.body["providers"]["openai"], false);
    assert_eq!(response.body["providers"]["gemini"], true);
}
