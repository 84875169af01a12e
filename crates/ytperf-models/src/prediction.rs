//! Prediction results and provenance.

use serde::{Deserialize, Serialize};

use crate::thumbnail::ThumbnailFeatures;

/// Version tag reported with every prediction.
pub const MODEL_VERSION: &str = "3.0";

/// Where a predicted value came from.
///
/// Heuristic stand-ins are tagged explicitly so callers and tests can
/// distinguish them from genuine model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "used", rename_all = "snake_case")]
pub enum PredictionSource {
    /// Produced by the loaded baseline/residual artifacts.
    Model,
    /// Produced by the fixed heuristic fallback.
    Fallback {
        /// Why the model path was not taken.
        reason: String,
    },
}

impl PredictionSource {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::Fallback {
            reason: reason.into(),
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model)
    }
}

/// A single predicted quantity plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredValue {
    pub value: f64,
    pub source: PredictionSource,
}

impl ScoredValue {
    pub fn model(value: f64) -> Self {
        Self {
            value,
            source: PredictionSource::Model,
        }
    }

    pub fn fallback(value: f64, reason: impl Into<String>) -> Self {
        Self {
            value,
            source: PredictionSource::fallback(reason),
        }
    }
}

/// Summary of the thumbnail features echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailAnalysis {
    pub brightness: f64,
    pub has_faces: bool,
    pub face_percentage: f64,
    pub has_text: bool,
    pub color_variance: f64,
    pub sharpness: f64,
}

impl From<&ThumbnailFeatures> for ThumbnailAnalysis {
    fn from(features: &ThumbnailFeatures) -> Self {
        Self {
            brightness: features.brightness,
            has_faces: features.face_area_percentage > 0.0,
            face_percentage: features.face_area_percentage,
            has_text: features.has_text > 0.0,
            color_variance: features.color_variance,
            sharpness: features.sharpness,
        }
    }
}

/// The full prediction response body. Computed fresh per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted view count, floored at 10.
    pub predicted_views: u64,
    /// Retention quality score, 0-100.
    pub predicted_rqs: f64,
    /// Click-through rate, clamped to [0.01, 2.0].
    pub predicted_ctr: f64,
    /// Weighted composite of normalized CTR, RQS and views-per-subscriber.
    pub performance_score: f64,
    pub thumbnail_analysis: ThumbnailAnalysis,
    /// 0.85 when a thumbnail was analyzed, 0.65 otherwise.
    pub confidence_score: f64,
    pub model_version: String,
    /// Provenance of each predicted quantity.
    pub sources: PredictionSources,
    /// Suggested upload tags derived from title and genre.
    pub recommended_tags: Vec<String>,
    /// Input corrections (e.g. invalid genre substitution).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Per-quantity provenance tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSources {
    pub ctr: PredictionSource,
    pub rqs: PredictionSource,
    pub views: PredictionSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serialization() {
        let model = serde_json::to_value(&PredictionSource::Model).unwrap();
        assert_eq!(model["used"], "model");

        let fallback = serde_json::to_value(PredictionSource::fallback("artifact missing")).unwrap();
        assert_eq!(fallback["used"], "fallback");
        assert_eq!(fallback["reason"], "artifact missing");
    }

    #[test]
    fn test_thumbnail_analysis_from_default_features() {
        let analysis = ThumbnailAnalysis::from(&ThumbnailFeatures::default());
        assert!(!analysis.has_faces);
        assert!(!analysis.has_text);
        assert_eq!(analysis.brightness, 128.0);
    }
}
