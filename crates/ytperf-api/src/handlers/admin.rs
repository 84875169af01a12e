//! Admin handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ReloadResponse {
    pub status: String,
    pub models_loaded: usize,
}

/// Re-read the artifact directory and atomically swap the loaded models.
/// In-flight requests keep scoring against the previous set.
pub async fn reload_models(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    match state.predictor.reload().await {
        Ok(count) => {
            metrics::record_artifact_reload(true);
            Ok(Json(ReloadResponse {
                status: "reloaded".to_string(),
                models_loaded: count,
            }))
        }
        Err(e) => {
            error!("artifact reload failed: {}", e);
            metrics::record_artifact_reload(false);
            Err(e.into())
        }
    }
}
