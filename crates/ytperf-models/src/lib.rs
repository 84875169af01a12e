//! Shared data models for the YTPerf prediction service.
//!
//! This crate provides Serde-serializable types for:
//! - Video prediction requests and their genre taxonomy
//! - Extracted thumbnail features
//! - Prediction results and their provenance tags

pub mod genre;
pub mod prediction;
pub mod request;
pub mod thumbnail;

// Re-export common types
pub use genre::Genre;
pub use prediction::{
    PredictionResult, PredictionSource, PredictionSources, ScoredValue, ThumbnailAnalysis,
    MODEL_VERSION,
};
pub use request::VideoRequest;
pub use thumbnail::{Rgb, ThumbnailFeatures};
