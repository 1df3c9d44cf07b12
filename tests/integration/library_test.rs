//! Prompt Library Integration Tests
//!
//! Prompts, folders and profile through the router, including user
//! isolation and regeneration against a mocked provider.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{app, get, openai_completion, post, send, OPENAI_PATH, USER};

fn prompt_body(title: &str) -> Value {
    json!({
        "title": title,
        "role": "Math Tutor",
        "instruction": "Explain derivatives",
        "metaPrompt": format!("Meta prompt for {}", title)
    })
}

async fn create_prompt(app: &axum::Router, title: &str) -> String {
    let response = post(app, "/api/prompts", prompt_body(title)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.raw);
    response.body["id"].as_str().unwrap().to_string()
}

async fn create_folder(app: &axum::Router, name: &str) -> String {
    let response = post(app, "/api/folders", json!({ "name": name, "color": "green" })).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.raw);
    response.body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_prompt_crud() {
    let server = MockServer::start().await;
    let app = app(&server);

    let id = create_prompt(&app, "Derivatives").await;

    let fetched = get(&app, &format!("/api/prompts/{}", id)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Derivatives");
    assert_eq!(fetched.body["usageCount"], 0);
    assert_eq!(fetched.body["isFavorite"], false);

    let updated = send(
        &app,
        Method::PATCH,
        &format!("/api/prompts/{}", id),
        Some(json!({ "title": "Integrals", "context": "College" })),
        Some(USER),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Integrals");
    assert_eq!(updated.body["context"], "College");
    assert_eq!(updated.body["role"], "Math Tutor");

    let deleted = send(&app, Method::DELETE, &format!("/api/prompts/{}", id), None, Some(USER)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = get(&app, &format!("/api/prompts/{}", id)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "not_found");
}

#[tokio::test]
async fn test_create_with_unknown_folder_stores_nothing() {
    let server = MockServer::start().await;
    let app = app(&server);

    let mut body = prompt_body("Orphan");
    body["folderIds"] = json!(["00000000-0000-0000-0000-000000000001"]);
    let response = post(&app, "/api/prompts", body).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "not_found");

    let list = get(&app, "/api/prompts").await;
    assert_eq!(list.body["total"], 0);
    assert_eq!(list.body["prompts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_prompts_are_isolated_per_user() {
    let server = MockServer::start().await;
    let app = app(&server);
    let id = create_prompt(&app, "Private").await;

    let other = send(&app, Method::GET, &format!("/api/prompts/{}", id), None, Some("intruder")).await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);

    let list = send(&app, Method::GET, "/api/prompts", None, Some("intruder")).await;
    assert_eq!(list.body["total"], 0);

    let anonymous = send(&app, Method::GET, "/api/prompts", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_with_query_filters() {
    let server = MockServer::start().await;
    let app = app(&server);
    let algebra = create_prompt(&app, "Algebra").await;
    create_prompt(&app, "Biology").await;
    create_prompt(&app, "Chemistry").await;

    post(&app, &format!("/api/prompts/{}/favorite", algebra), json!({})).await;

    let favorites = get(&app, "/api/prompts?favorite=true").await;
    assert_eq!(favorites.status, StatusCode::OK, "{}", favorites.raw);
    assert_eq!(favorites.body["total"], 1);
    assert_eq!(favorites.body["prompts"][0]["title"], "Algebra");

    let search = get(&app, "/api/prompts?search=chem").await;
    assert_eq!(search.body["total"], 1);

    let page = get(&app, "/api/prompts?orderBy=title&order=desc&limit=2").await;
    assert_eq!(page.body["total"], 3);
    assert_eq!(page.body["prompts"].as_array().unwrap().len(), 2);
    assert_eq!(page.body["prompts"][0]["title"], "Chemistry");

    let bad = get(&app, "/api/prompts?orderBy=colour").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_use_duplicate_and_stats() {
    let server = MockServer::start().await;
    let app = app(&server);
    let id = create_prompt(&app, "Algebra").await;

    let used = post(&app, &format!("/api/prompts/{}/use", id), json!({})).await;
    assert_eq!(used.body["usageCount"], 1);
    assert!(used.body["lastUsedAt"].is_string());

    let copy = post(&app, &format!("/api/prompts/{}/duplicate", id), json!({})).await;
    assert_eq!(copy.status, StatusCode::CREATED);
    assert_eq!(copy.body["title"], "Algebra (Copy)");
    assert_eq!(copy.body["usageCount"], 0);
    assert_eq!(copy.body["metaPrompt"], "Meta prompt for Algebra");

    create_folder(&app, "Math").await;
    let stats = get(&app, "/api/prompts/stats").await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["totalPrompts"], 2);
    assert_eq!(stats.body["favoritePrompts"], 0);
    assert_eq!(stats.body["totalFolders"], 1);
    assert_eq!(stats.body["mostUsedPrompt"]["id"], id.as_str());
}

#[tokio::test]
async fn test_duplicate_of_longest_title() {
    let server = MockServer::start().await;
    let app = app(&server);
    let id = create_prompt(&app, &"t".repeat(100)).await;

    let copy = post(&app, &format!("/api/prompts/{}/duplicate", id), json!({})).await;
    assert_eq!(copy.status, StatusCode::CREATED, "{}", copy.raw);
    let title = copy.body["title"].as_str().unwrap();
    assert_eq!(title.chars().count(), 100);
    assert!(title.ends_with("t (Copy)"));
}

#[tokio::test]
async fn test_folders_and_assignments() {
    let server = MockServer::start().await;
    let app = app(&server);
    let prompt = create_prompt(&app, "Algebra").await;
    let math = create_folder(&app, "Math").await;
    let school = create_folder(&app, "School").await;

    let duplicate = post(&app, "/api/folders", json!({ "name": "math" })).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let assigned = send(
        &app,
        Method::PUT,
        &format!("/api/prompts/{}/folders", prompt),
        Some(json!({ "folderIds": [math, school] })),
        Some(USER),
    )
    .await;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(assigned.body["folderIds"].as_array().unwrap().len(), 2);

    let folder = get(&app, &format!("/api/folders/{}", math)).await;
    assert_eq!(folder.body["promptCount"], 1);
    assert_eq!(folder.body["color"], "green");

    let in_folder = get(&app, &format!("/api/prompts?folderId={}", school)).await;
    assert_eq!(in_folder.body["total"], 1);

    let removed = send(
        &app,
        Method::DELETE,
        &format!("/api/folders/{}/prompts/{}", school, prompt),
        None,
        Some(USER),
    )
    .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    let contents = get(&app, &format!("/api/folders/{}/prompts", school)).await;
    assert_eq!(contents.body.as_array().unwrap().len(), 0);

    let added = send(
        &app,
        Method::POST,
        &format!("/api/folders/{}/prompts/{}", school, prompt),
        None,
        Some(USER),
    )
    .await;
    assert_eq!(added.status, StatusCode::NO_CONTENT);

    let renamed = send(
        &app,
        Method::PATCH,
        &format!("/api/folders/{}", math),
        Some(json!({ "name": "Mathematics" })),
        Some(USER),
    )
    .await;
    assert_eq!(renamed.body["name"], "Mathematics");

    let deleted = send(&app, Method::DELETE, &format!("/api/folders/{}", math), None, Some(USER)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let folders = get(&app, "/api/folders").await;
    assert_eq!(folders.body.as_array().unwrap().len(), 1);
    assert_eq!(folders.body[0]["name"], "School");

    let survivor = get(&app, &format!("/api/prompts/{}", prompt)).await;
    assert_eq!(survivor.status, StatusCode::OK);
}

#[tokio::test]
async fn test_folder_validation() {
    let server = MockServer::start().await;
    let app = app(&server);

    let response = post(&app, "/api/folders", json!({ "name": "", "color": "orange" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let issues = response.body["details"]["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 2);
}

#[tokio::test]
async fn test_invalid_path_id() {
    let server = MockServer::start().await;
    let app = app(&server);

    let response = get(&app, "/api/prompts/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "validation_error");
}

#[tokio::test]
async fn test_regenerate_updates_meta_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion("Fresh meta prompt")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let id = create_prompt(&app, "Algebra").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/prompts/{}/regenerate", id),
        None,
        Some(USER),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["metaPrompt"], "Fresh meta prompt");
    assert_eq!(response.body["promptId"], id.as_str());

    let stored = get(&app, &format!("/api/prompts/{}", id)).await;
    assert_eq!(stored.body["metaPrompt"], "Fresh meta prompt");
    assert_eq!(stored.body["usageCount"], 1);
}

#[tokio::test]
async fn test_profile_defaults_and_update() {
    let server = MockServer::start().await;
    let app = app(&server);

    let profile = get(&app, "/api/profile").await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["id"], USER);
    assert_eq!(profile.body["themePreference"], "system");
    assert!(profile.body["preferredProvider"].is_null());

    let updated = send(
        &app,
        Method::PUT,
        "/api/profile",
        Some(json!({ "fullName": "Ada Lovelace", "themePreference": "dark" })),
        Some(USER),
    )
    .await;
    assert_eq!(updated.body["fullName"], "Ada Lovelace");
    assert_eq!(updated.body["themePreference"], "dark");
}
