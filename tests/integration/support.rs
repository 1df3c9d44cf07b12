//! Test harness for router-level tests

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use promptbook_llm::ProviderKind;
use promptbook_server::{router, AppState, ServerConfig};

pub const USER: &str = "user-123";
pub const OPENAI_PATH: &str = "/v1/chat/completions";
pub const GEMINI_GENERATE_PATH: &str = "/v1beta/models/gemini-pro:generateContent";

/// Config pointing both providers at `server`, with keys set as given
pub fn config_for(server: &MockServer, openai_key: Option<&str>, gemini_key: Option<&str>) -> ServerConfig {
    let mut config = ServerConfig::default()
        .with_base_url(ProviderKind::OpenAI, format!("{}{}", server.uri(), OPENAI_PATH))
        .with_base_url(ProviderKind::Gemini, format!("{}/v1beta/models", server.uri()));
    if let Some(key) = openai_key {
        config = config.with_api_key(ProviderKind::OpenAI, key);
    }
    if let Some(key) = gemini_key {
        config = config.with_api_key(ProviderKind::Gemini, key);
    }
    config
}

/// Router with both keys configured
pub fn app(server: &MockServer) -> Router {
    app_with(config_for(server, Some("sk-openai-test-key"), Some("gm-test-key")))
}

pub fn app_with(config: ServerConfig) -> Router {
    router(AppState::from_config(config).expect("state"))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
    pub raw: String,
}

/// Send a request, authenticated as [`USER`] unless `user` is `None`
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    user: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let raw = String::from_utf8_lossy(&bytes).to_string();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        content_type,
        body,
        raw,
    }
}

pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body), Some(USER)).await
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None, Some(USER)).await
}

/// An OpenAI chat completion body with `content`
pub fn openai_completion(content: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200 }
    })
}

/// A Gemini generateContent body with `text`
pub fn gemini_completion(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 50, "candidatesTokenCount": 25, "totalTokenCount": 75 }
    })
}
