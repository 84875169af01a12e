//! Shared application state.

use std::sync::Arc;

use ytperf_scoring::PredictionService;

use crate::config::ApiConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub predictor: Arc<PredictionService>,
}

impl AppState {
    pub fn new(config: ApiConfig, predictor: PredictionService) -> Self {
        Self {
            config: Arc::new(config),
            predictor: Arc::new(predictor),
        }
    }
}
