//! Model scoring and prediction orchestration for YTPerf.
//!
//! [`artifact`] loads the pre-trained baseline/residual linear models,
//! scalers, guardrail table and text vectorizers from a directory once at
//! startup. [`scorer`] applies them with heuristic fallbacks, and
//! [`predictor`] sequences CTR → RQS → Views into a full
//! [`ytperf_models::PredictionResult`].

pub mod artifact;
pub mod error;
pub mod guardrails;
pub mod predictor;
pub mod scorer;
pub mod tags;

pub use artifact::{BaselineResidual, LinearModel, LoadedModels, StandardScaler};
pub use error::{ScoringError, ScoringResult};
pub use guardrails::GuardrailTable;
pub use predictor::{PredictionInput, PredictionService};
pub use tags::generate_recommended_tags;
