//! Prediction orchestration.
//!
//! One linear sequence per request: normalize genre → extract thumbnail
//! features → CTR → RQS → Views (consuming CTR/RQS) → composite score →
//! packaged result. No step retries or cancels; each degrades to its
//! fallback independently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use ytperf_features::{SlotEmbeddings, ThumbnailExtractor};
use ytperf_models::{
    Genre, PredictionResult, PredictionSources, ThumbnailAnalysis, ThumbnailFeatures,
    VideoRequest, MODEL_VERSION,
};

use crate::artifact::LoadedModels;
use crate::error::ScoringResult;
use crate::scorer;
use crate::tags::generate_recommended_tags;

/// Confidence reported when a thumbnail was analyzed vs defaulted.
const CONFIDENCE_WITH_THUMBNAIL: f64 = 0.85;
const CONFIDENCE_WITHOUT_THUMBNAIL: f64 = 0.65;

/// CTR at which the normalized CTR component of the performance score
/// saturates at 100.
const CTR_SCORE_NORM: f64 = 0.05;

/// Raw, unvalidated prediction input as it arrives from the HTTP layer.
#[derive(Debug, Clone)]
pub struct PredictionInput {
    pub title: String,
    /// Raw genre string; corrected to "unknown" when invalid.
    pub genre: String,
    pub subscriber_count: u64,
    pub duration_seconds: Option<u64>,
    pub thumbnail: Option<Vec<u8>>,
}

/// The prediction pipeline as an explicitly constructed service object.
///
/// Owns the loaded artifacts behind a swap-on-reload lock; handlers take a
/// cheap snapshot per request and never hold the lock across scoring.
pub struct PredictionService {
    models_dir: PathBuf,
    store: RwLock<Arc<LoadedModels>>,
    extractor: ThumbnailExtractor,
}

impl PredictionService {
    /// Load all artifacts from `models_dir`. Fails only on artifacts that
    /// exist but cannot be parsed; missing artifacts degrade to fallbacks.
    pub fn load(models_dir: impl Into<PathBuf>) -> ScoringResult<Self> {
        let models_dir = models_dir.into();
        let models = LoadedModels::load(&models_dir)?;
        Ok(Self {
            models_dir,
            store: RwLock::new(Arc::new(models)),
            extractor: ThumbnailExtractor::new(),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Snapshot of the currently loaded artifact set.
    pub async fn models(&self) -> Arc<LoadedModels> {
        self.store.read().await.clone()
    }

    /// Re-read the artifact directory and swap the loaded set atomically.
    /// Returns the number of models now loaded.
    pub async fn reload(&self) -> ScoringResult<usize> {
        let fresh = LoadedModels::load(&self.models_dir)?;
        let count = fresh.model_count();
        *self.store.write().await = Arc::new(fresh);
        info!("reloaded artifacts, {} models now loaded", count);
        Ok(count)
    }

    /// Run the full prediction sequence. Never fails: every internal step
    /// has a documented fallback.
    #[instrument(skip_all, fields(genre = %input.genre, subs = input.subscriber_count))]
    pub async fn predict(&self, input: PredictionInput) -> PredictionResult {
        let models = self.models().await;
        let mut warnings = Vec::new();

        // 1. Normalize genre; correct rather than reject.
        let (genre, warning) = Genre::normalize(&input.genre);
        if let Some(warning) = warning {
            warnings.push(warning);
        }

        let mut request = VideoRequest::new(input.title, genre, input.subscriber_count);
        if let Some(duration) = input.duration_seconds {
            request = request.with_duration(duration);
        }

        // 2. Thumbnail features, or the fixed defaults.
        let has_thumbnail = input.thumbnail.is_some();
        let thumbnail = match &input.thumbnail {
            Some(bytes) => self.extractor.extract(bytes),
            None => ThumbnailFeatures::default(),
        };

        let embeddings = SlotEmbeddings::for_request(&models.embedder, &request);

        // 3-5. Chained predictions: Views consumes CTR and RQS.
        let ctr = scorer::predict_ctr(&models, &request, &thumbnail, &embeddings);
        let rqs = scorer::predict_rqs(&models, &request, &thumbnail, &embeddings);
        let views = scorer::predict_views(&models, &request, ctr.value, rqs.value);

        // 6. Composite performance score: weighted blend of normalized
        // CTR, RQS and views-per-subscriber.
        let subs = (request.subscriber_count as f64).max(1.0);
        let ctr_score = (ctr.value / CTR_SCORE_NORM * 100.0).min(100.0);
        let vps_score = (views.value / subs * 100.0).min(100.0);
        let performance_score = ctr_score * 0.3 + rqs.value * 0.4 + vps_score * 0.3;

        let recommended_tags =
            generate_recommended_tags(&request.title, genre, request.subscriber_count);

        // 7. Package.
        PredictionResult {
            predicted_views: views.value.round().max(scorer::VIEWS_FLOOR) as u64,
            predicted_rqs: rqs.value.clamp(0.0, 100.0),
            predicted_ctr: ctr.value,
            performance_score,
            thumbnail_analysis: ThumbnailAnalysis::from(&thumbnail),
            confidence_score: if has_thumbnail {
                CONFIDENCE_WITH_THUMBNAIL
            } else {
                CONFIDENCE_WITHOUT_THUMBNAIL
            },
            model_version: MODEL_VERSION.to_string(),
            sources: PredictionSources {
                ctr: ctr.source,
                rqs: rqs.source,
                views: views.source,
            },
            recommended_tags,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, genre: &str, subs: u64) -> PredictionInput {
        PredictionInput {
            title: title.to_string(),
            genre: genre.to_string(),
            subscriber_count: subs,
            duration_seconds: None,
            thumbnail: None,
        }
    }

    fn service() -> PredictionService {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::load(dir.path()).unwrap();
        // Keep the tempdir alive for the test by leaking it; reload is not
        // exercised against a deleted directory.
        std::mem::forget(dir);
        service
    }

    #[tokio::test]
    async fn test_example_scenario_gaming() {
        let service = service();
        let result = service
            .predict(input("EPIC MINECRAFT BUILD CHALLENGE!", "gaming", 100_000))
            .await;

        assert!(result.predicted_views >= 10);
        assert!((0.0..=100.0).contains(&result.predicted_rqs));
        assert!((0.01..=2.0).contains(&result.predicted_ctr));
        assert!(result.warnings.is_empty());
        // Defaults: neutral brightness, no faces.
        assert_eq!(result.thumbnail_analysis.brightness, 128.0);
        assert!(!result.thumbnail_analysis.has_faces);
        assert_eq!(result.confidence_score, 0.65);
        assert_eq!(result.model_version, MODEL_VERSION);
    }

    #[tokio::test]
    async fn test_invalid_genre_is_corrected_with_warning() {
        let service = service();
        let result = service.predict(input("Test", "not_a_real_genre", 1000)).await;

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("not_a_real_genre"));
        assert!(result.warnings[0].contains("unknown"));
        assert!(result.predicted_views >= 10);
        assert!((0.0..=100.0).contains(&result.predicted_rqs));
    }

    #[tokio::test]
    async fn test_zero_subscribers_is_well_formed() {
        let service = service();
        let result = service.predict(input("t", "gaming", 0)).await;
        assert!(result.predicted_views >= 10);
        assert!(result.performance_score.is_finite());
    }

    #[tokio::test]
    async fn test_identical_inputs_are_deterministic() {
        let service = service();
        let a = service.predict(input("Same title", "gaming", 5000)).await;
        let b = service.predict(input("Same title", "gaming", 5000)).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_corrupt_thumbnail_uses_defaults() {
        let service = service();
        let mut req = input("t", "gaming", 1000);
        req.thumbnail = Some(b"not an image".to_vec());
        let result = service.predict(req).await;

        assert_eq!(result.thumbnail_analysis.brightness, 128.0);
        assert!(!result.thumbnail_analysis.has_faces);
        // A thumbnail was supplied, even though it degraded to defaults.
        assert_eq!(result.confidence_score, 0.85);
    }

    #[tokio::test]
    async fn test_fallback_sources_are_tagged() {
        let service = service();
        let result = service.predict(input("t", "gaming", 1000)).await;
        assert!(!result.sources.ctr.is_model());
        assert!(!result.sources.rqs.is_model());
        assert!(!result.sources.views.is_model());
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::load(dir.path()).unwrap();
        assert_eq!(service.models().await.model_count(), 0);

        let body = serde_json::json!({
            "features": ["brightness"],
            "coefficients": [0.1],
            "intercept": 20.0,
        });
        std::fs::write(
            dir.path().join(crate::artifact::RQS_MODEL_FILE),
            serde_json::to_vec(&body).unwrap(),
        )
        .unwrap();

        assert_eq!(service.reload().await.unwrap(), 1);
        let result = service.predict(input("t", "gaming", 1000)).await;
        assert!(result.sources.rqs.is_model());
        // brightness 128 * 0.1 + 20 = 32.8, inside the model clamp.
        assert!((result.predicted_rqs - 32.8).abs() < 1e-9);
    }
}
