//! Health and model-status handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Service info response for the root path.
#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub models_loaded: usize,
}

/// Root endpoint: service identification plus a quick model census.
pub async fn index(State(state): State<AppState>) -> Json<ServiceInfo> {
    let models = state.predictor.models().await;
    Json(ServiceInfo {
        service: "ytperf-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models_loaded: models.model_count(),
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: usize,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe). Always healthy: missing models
/// degrade predictions to fallbacks rather than taking the service down.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state.predictor.models().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        models_loaded: models.model_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Per-artifact load status.
#[derive(Serialize)]
pub struct ModelsStatusResponse {
    pub models_dir: String,
    pub models_loaded: Vec<&'static str>,
    pub embeddings_loaded: Vec<&'static str>,
    pub guardrail_entries: usize,
    pub model_version: String,
}

/// Model status endpoint: which artifacts loaded at startup (or last reload).
pub async fn models_status(State(state): State<AppState>) -> Json<ModelsStatusResponse> {
    let models = state.predictor.models().await;
    Json(ModelsStatusResponse {
        models_dir: state.predictor.models_dir().display().to_string(),
        models_loaded: models.loaded_model_names(),
        embeddings_loaded: models.embedder.loaded_slots(),
        guardrail_entries: models.guardrails.len(),
        model_version: ytperf_models::MODEL_VERSION.to_string(),
    })
}
