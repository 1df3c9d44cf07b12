//! HTTP Handlers
//!
//! axum handlers grouped by resource, and the router that wires them up.
//! Every route except `/health`, `/api/prompts/validate` and
//! `/api/llm/status` requires the `x-user-id` header.

pub mod folders;
pub mod generate;
pub mod health;
pub mod llm;
pub mod profile;
pub mod prompts;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let prompt_routes = Router::new()
        .route("/", get(prompts::list_prompts).post(prompts::create_prompt))
        .route("/generate", post(generate::generate))
        .route("/generate/stream", post(generate::generate_stream))
        .route("/validate", post(generate::validate))
        .route("/stats", get(prompts::prompt_stats))
        .route(
            "/{id}",
            get(prompts::get_prompt)
                .patch(prompts::update_prompt)
                .delete(prompts::delete_prompt),
        )
        .route("/{id}/favorite", post(prompts::toggle_favorite))
        .route("/{id}/use", post(prompts::record_use))
        .route("/{id}/duplicate", post(prompts::duplicate_prompt))
        .route("/{id}/regenerate", post(prompts::regenerate_prompt))
        .route(
            "/{id}/folders",
            get(prompts::prompt_folders).put(prompts::assign_folders),
        );

    let folder_routes = Router::new()
        .route("/", get(folders::list_folders).post(folders::create_folder))
        .route(
            "/{id}",
            get(folders::get_folder)
                .patch(folders::update_folder)
                .delete(folders::delete_folder),
        )
        .route("/{id}/prompts", get(folders::folder_prompts))
        .route(
            "/{id}/prompts/{prompt_id}",
            post(folders::add_prompt).delete(folders::remove_prompt),
        );

    let llm_routes = Router::new()
        .route("/openai", post(llm::openai_chat))
        .route("/gemini", post(llm::gemini_generate))
        .route("/status", get(llm::provider_status))
        .route("/test", post(llm::test_connection));

    Router::new()
        .route("/health", get(health::get_health))
        .nest("/api/prompts", prompt_routes)
        .nest("/api/folders", folder_routes)
        .nest("/api/llm", llm_routes)
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
