//! Scoring error types.

use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("artifact read failed ({path}): {source}")]
    ArtifactRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact parse failed ({path}): {source}")]
    ArtifactParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact is inconsistent: {0}")]
    ArtifactInvalid(String),

    #[error("feature shape mismatch: model expects {expected}, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("feature error: {0}")]
    Feature(#[from] ytperf_features::FeatureError),
}
