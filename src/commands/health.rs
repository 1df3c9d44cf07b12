//! Health Check Handler

use axum::extract::State;
use axum::Json;

use promptbook_llm::ProviderKind;

use crate::models::response::{HealthResponse, ProviderHealth};
use crate::state::AppState;

/// `GET /health`. Always 200; missing keys only degrade the status.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = ProviderHealth {
        openai: state.is_provider_configured(ProviderKind::OpenAI),
        gemini: state.is_provider_configured(ProviderKind::Gemini),
    };

    let status = if providers.openai || providers.gemini {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        providers,
        ..Default::default()
    })
}
