//! Generation Integration Tests
//!
//! `POST /api/prompts/generate` end to end:
//! - Tutor request through a mocked OpenAI upstream
//! - Oversize and invalid input never reach a provider
//! - Provider failures map onto stable status codes, without retry
//! - Provider precedence: explicit > profile preference > default
//! - Saving the result into the library

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promptbook_core::compiler::{CONTEXT_FALLBACK, EXAMPLE_FALLBACK, PERSONALITY_FALLBACK};

use super::support::{
    app, app_with, config_for, gemini_completion, get, openai_completion, post, send,
    GEMINI_GENERATE_PATH, OPENAI_PATH,
};

fn tutor() -> Value {
    json!({
        "role": "Math Tutor",
        "personality": "Patient and encouraging",
        "instruction": "Explain derivatives to a beginner",
        "context": "High school calculus class"
    })
}

async fn last_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    requests.last().unwrap().body_json::<Value>().unwrap()
}

#[tokio::test]
async fn test_tutor_end_to_end_via_openai() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_completion("## Generated Meta-Prompt\nYou are a Math Tutor...")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(&app, "/api/prompts/generate", tutor()).await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert!(response.body["metaPrompt"]
        .as_str()
        .unwrap()
        .starts_with("## Generated Meta-Prompt"));
    assert_eq!(response.body["provider"], "openai");
    assert_eq!(response.body["model"], "gpt-3.5-turbo-0125");
    assert_eq!(response.body["usage"]["total_tokens"], 200);
    assert!(response.body.get("promptId").is_none());

    let sent = last_request_body(&server).await;
    assert_eq!(sent["model"], "gpt-3.5-turbo");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["role"], "user");
    let user_prompt = sent["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("Role: Math Tutor"));
    assert!(user_prompt.contains("Personality: Patient and encouraging"));
    assert!(user_prompt.contains("Context: High school calculus class"));
}

#[tokio::test]
async fn test_chef_request_uses_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("Chef prompt")))
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/prompts/generate",
        json!({ "role": "Chef", "instruction": "Write a recipe" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let sent = last_request_body(&server).await;
    let user_prompt = sent["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("Role: Chef"));
    assert!(user_prompt.contains("Instruction: Write a recipe"));
    assert!(user_prompt.contains(PERSONALITY_FALLBACK));
    assert!(user_prompt.contains(CONTEXT_FALLBACK));
    assert!(user_prompt.contains(EXAMPLE_FALLBACK));
}

#[tokio::test]
async fn test_oversize_input_rejected_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(
        &app,
        "/api/prompts/generate",
        json!({ "role": "Tutor", "instruction": "a".repeat(17_000) }),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");
    assert_eq!(response.body["details"]["maxTokens"], 4000);
}

#[tokio::test]
async fn test_missing_role_is_field_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(&app, "/api/prompts/generate", json!({ "instruction": "Explain" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"]["issues"][0]["field"], "role");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let server = MockServer::start().await;
    let app = app(&server);
    let response = post(&app, "/api/prompts/generate", json!({ "role": 42 })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");
}

#[tokio::test]
async fn test_openai_rate_limit_single_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": { "message": "Rate limit reached" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(&app, "/api/prompts/generate", tutor()).await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["code"], "rate_limited");
    assert_eq!(
        response.body["error"],
        "Rate limit exceeded. Please try again later."
    );
}

#[tokio::test]
async fn test_gemini_safety_block_is_unprocessable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_GENERATE_PATH))
        .and(query_param("key", "gm-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let mut body = tutor();
    body["provider"] = json!("gemini");
    let response = post(&app, "/api/prompts/generate", body).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["code"], "content_blocked");
}

#[tokio::test]
async fn test_missing_openai_key_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app_with(config_for(&server, None, Some("gm-test-key")));
    let response = post(&app, "/api/prompts/generate", tutor()).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["code"], "provider_not_configured");
    assert!(!response.raw.contains("gm-test-key"));
}

#[tokio::test]
async fn test_upstream_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided: sk-opena***" }
        })))
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(&app, "/api/prompts/generate", tutor()).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "provider_auth_failed");
    assert_eq!(response.body["error"], "Invalid API key");
}

#[tokio::test]
async fn test_missing_user_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&server);
    let response = send(&app, Method::POST, "/api/prompts/generate", Some(tutor()), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "unauthenticated");
}

#[tokio::test]
async fn test_profile_preference_selects_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_completion("From Gemini")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("From OpenAI")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let profile = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(json!({ "preferredProvider": "gemini" })),
        Some(super::support::USER),
    )
    .await;
    assert_eq!(profile.status, StatusCode::OK);

    let preferred = post(&app, "/api/prompts/generate", tutor()).await;
    assert_eq!(preferred.body["metaPrompt"], "From Gemini");
    assert_eq!(preferred.body["provider"], "gemini");

    let mut explicit = tutor();
    explicit["provider"] = json!("openai");
    let explicit = post(&app, "/api/prompts/generate", explicit).await;
    assert_eq!(explicit.body["metaPrompt"], "From OpenAI");
}

#[tokio::test]
async fn test_generate_and_save() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("Saved meta prompt")))
        .mount(&server)
        .await;

    let app = app(&server);

    let mut unsaved = tutor();
    unsaved["save"] = json!(true);
    let missing_title = post(&app, "/api/prompts/generate", unsaved).await;
    assert_eq!(missing_title.status, StatusCode::BAD_REQUEST);

    let mut body = tutor();
    body["save"] = json!(true);
    body["title"] = json!("Derivatives Tutor");
    let response = post(&app, "/api/prompts/generate", body).await;
    assert_eq!(response.status, StatusCode::OK);

    let id = response.body["promptId"].as_str().unwrap().to_string();
    let stored = get(&app, &format!("/api/prompts/{}", id)).await;
    assert_eq!(stored.body["title"], "Derivatives Tutor");
    assert_eq!(stored.body["metaPrompt"], "Saved meta prompt");
}

#[tokio::test]
async fn test_save_into_unknown_folder_is_rejected_before_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(&server);
    let mut body = tutor();
    body["save"] = json!(true);
    body["title"] = json!("Derivatives Tutor");
    body["folderIds"] = json!(["00000000-0000-0000-0000-000000000001"]);
    let response = post(&app, "/api/prompts/generate", body).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", response.raw);
    let list = get(&app, "/api/prompts").await;
    assert_eq!(list.body["total"], 0);
}

#[tokio::test]
async fn test_streamed_generation_is_reassembled() {
    let server = MockServer::start().await;
    let sse = concat!(
        "data: {\"model\":\"gpt-3.5-turbo\",\"choices\":[{\"delta\":{\"content\":\"## Generated \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Meta-Prompt\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .mount(&server)
        .await;

    let app = app(&server);
    let mut body = tutor();
    body["stream"] = json!(true);
    let response = post(&app, "/api/prompts/generate", body).await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["metaPrompt"], "## Generated Meta-Prompt");

    let sent = last_request_body(&server).await;
    assert_eq!(sent["stream"], true);
}

#[tokio::test]
async fn test_generate_stream_route_passes_bytes_through() {
    let server = MockServer::start().await;
    let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .mount(&server)
        .await;

    let app = app(&server);
    let response = post(&app, "/api/prompts/generate/stream", tutor()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("text/event-stream"));
    assert_eq!(response.raw, sse);
}

#[tokio::test]
async fn test_validate_reports_size_and_cost() {
    let server = MockServer::start().await;
    let app = app(&server);

    let ok = send(&app, Method::POST, "/api/prompts/validate", Some(tutor()), None).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["ok"], true);
    assert_eq!(ok.body["maxTokens"], 4000);
    assert!(ok.body["estimatedCost"]["openai"].as_f64().unwrap() > 0.0);

    let big = post(
        &app,
        "/api/prompts/validate",
        json!({ "role": "Tutor", "instruction": "a".repeat(17_000) }),
    )
    .await;
    assert_eq!(big.status, StatusCode::OK);
    assert_eq!(big.body["ok"], false);
    assert!(big.body["reason"].as_str().unwrap().contains("too long"));
}
