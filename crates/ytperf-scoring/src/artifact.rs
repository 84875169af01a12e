//! Model artifact loading.
//!
//! Artifacts are JSON files in a single directory, loaded once at startup
//! and immutable for the process lifetime. Each model carries the ordered
//! feature-name list it was trained with, so the assembler resolves
//! columns by explicit schema rather than position.
//!
//! Policy: a missing artifact file degrades that model to its heuristic
//! fallback (logged at warn); a file that exists but does not parse is a
//! startup error.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use ytperf_features::TextEmbedder;

use crate::error::{ScoringError, ScoringResult};
use crate::guardrails::GuardrailTable;

pub const CTR_BASELINE_FILE: &str = "ctr_baseline.json";
pub const CTR_RESIDUAL_FILE: &str = "ctr_residual.json";
pub const RQS_MODEL_FILE: &str = "rqs_model.json";
pub const VIEWS_BASELINE_FILE: &str = "views_baseline.json";
pub const VIEWS_RESIDUAL_FILE: &str = "views_residual.json";
pub const VIEWS_SCALER_FILE: &str = "views_scaler.json";
pub const GUARDRAILS_FILE: &str = "views_guardrails.json";

/// A pre-trained linear regression: named features, coefficients and an
/// intercept.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Apply the model to an assembled feature vector.
    ///
    /// A shape mismatch is how a stale artifact shows up at runtime; it is
    /// reported as an error so the caller can fall back.
    pub fn predict(&self, x: &[f64]) -> ScoringResult<f64> {
        if x.len() != self.coefficients.len() {
            return Err(ScoringError::FeatureShape {
                expected: self.coefficients.len(),
                actual: x.len(),
            });
        }
        Ok(self.intercept
            + x.iter()
                .zip(&self.coefficients)
                .map(|(xi, ci)| xi * ci)
                .sum::<f64>())
    }

    fn validate(self, name: &str) -> ScoringResult<Self> {
        if self.features.len() != self.coefficients.len() {
            return Err(ScoringError::ArtifactInvalid(format!(
                "{}: {} feature names but {} coefficients",
                name,
                self.features.len(),
                self.coefficients.len()
            )));
        }
        Ok(self)
    }
}

/// Per-column standardization fitted at training time.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, x: &[f64]) -> ScoringResult<Vec<f64>> {
        if x.len() != self.mean.len() || self.mean.len() != self.std.len() {
            return Err(ScoringError::FeatureShape {
                expected: self.mean.len(),
                actual: x.len(),
            });
        }
        Ok(x.iter()
            .enumerate()
            .map(|(i, xi)| {
                let std = if self.std[i] > 0.0 { self.std[i] } else { 1.0 };
                (xi - self.mean[i]) / std
            })
            .collect())
    }
}

/// A coarse baseline model paired with a fine-grained residual model.
/// Final score = baseline + residual (then inverse-log-transformed for
/// log targets).
#[derive(Debug, Clone)]
pub struct BaselineResidual {
    pub baseline: LinearModel,
    pub residual: LinearModel,
    pub scaler: Option<StandardScaler>,
}

/// Every artifact the scorer needs, loaded from one directory.
///
/// Read-only after load; the owning service swaps the whole set atomically
/// on reload.
pub struct LoadedModels {
    pub ctr: Option<BaselineResidual>,
    pub rqs: Option<LinearModel>,
    pub views: Option<BaselineResidual>,
    pub guardrails: GuardrailTable,
    pub embedder: TextEmbedder,
}

impl LoadedModels {
    /// Load all artifacts under `dir`.
    pub fn load(dir: &Path) -> ScoringResult<Self> {
        let ctr = match (
            load_optional::<LinearModel>(dir, CTR_BASELINE_FILE)?,
            load_optional::<LinearModel>(dir, CTR_RESIDUAL_FILE)?,
        ) {
            (Some(baseline), Some(residual)) => Some(BaselineResidual {
                baseline: baseline.validate(CTR_BASELINE_FILE)?,
                residual: residual.validate(CTR_RESIDUAL_FILE)?,
                scaler: None,
            }),
            (baseline, residual) => {
                if baseline.is_some() != residual.is_some() {
                    warn!("ctr artifacts incomplete, ctr degrades to fallback");
                }
                None
            }
        };

        let rqs = load_optional::<LinearModel>(dir, RQS_MODEL_FILE)?
            .map(|m| m.validate(RQS_MODEL_FILE))
            .transpose()?;

        let views = match (
            load_optional::<LinearModel>(dir, VIEWS_BASELINE_FILE)?,
            load_optional::<LinearModel>(dir, VIEWS_RESIDUAL_FILE)?,
        ) {
            (Some(baseline), Some(residual)) => Some(BaselineResidual {
                baseline: baseline.validate(VIEWS_BASELINE_FILE)?,
                residual: residual.validate(VIEWS_RESIDUAL_FILE)?,
                scaler: load_optional::<StandardScaler>(dir, VIEWS_SCALER_FILE)?,
            }),
            (baseline, residual) => {
                if baseline.is_some() != residual.is_some() {
                    warn!("views artifacts incomplete, views degrades to fallback");
                }
                None
            }
        };

        let guardrails = load_optional::<GuardrailTable>(dir, GUARDRAILS_FILE)?.unwrap_or_default();

        let embedder = TextEmbedder::load(dir)?;

        let models = Self {
            ctr,
            rqs,
            views,
            guardrails,
            embedder,
        };
        info!(
            "loaded models: {:?}, {} guardrail segments, vectorizers: {:?}",
            models.loaded_model_names(),
            models.guardrails.len(),
            models.embedder.loaded_slots()
        );
        Ok(models)
    }

    /// Names of the models that loaded successfully.
    pub fn loaded_model_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.ctr.is_some() {
            names.push("ctr");
        }
        if self.rqs.is_some() {
            names.push("rqs");
        }
        if self.views.is_some() {
            names.push("views");
        }
        names
    }

    pub fn model_count(&self) -> usize {
        self.loaded_model_names().len()
    }
}

/// Read and parse an artifact, treating a missing file as "not trained"
/// rather than an error.
fn load_optional<T: DeserializeOwned>(dir: &Path, file: &str) -> ScoringResult<Option<T>> {
    let path = dir.join(file);
    if !path.exists() {
        warn!("artifact {} not found, skipping", path.display());
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path).map_err(|source| ScoringError::ArtifactRead {
        path: path.display().to_string(),
        source,
    })?;
    let value = serde_json::from_str(&raw).map_err(|source| ScoringError::ArtifactParse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn write_model(dir: &Path, file: &str, features: &[&str], coefficients: &[f64], intercept: f64) {
        let body = serde_json::json!({
            "features": features,
            "coefficients": coefficients,
            "intercept": intercept,
        });
        std::fs::write(dir.join(file), serde_json::to_vec(&body).unwrap()).unwrap();
    }

    #[test]
    fn test_linear_model_predict() {
        let model = LinearModel {
            features: vec!["a".into(), "b".into()],
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
        };
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_linear_model_shape_mismatch() {
        let model = LinearModel {
            features: vec!["a".into()],
            coefficients: vec![2.0],
            intercept: 0.0,
        };
        assert!(matches!(
            model.predict(&[1.0, 2.0]),
            Err(ScoringError::FeatureShape { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_scaler_transform() {
        let scaler = StandardScaler {
            mean: vec![10.0, 0.0],
            std: vec![2.0, 0.0],
        };
        let scaled = scaler.transform(&[14.0, 5.0]).unwrap();
        assert_eq!(scaled, vec![2.0, 5.0]);
    }

    #[test]
    fn test_empty_dir_loads_with_no_models() {
        let dir = tempfile::tempdir().unwrap();
        let models = LoadedModels::load(dir.path()).unwrap();
        assert!(models.loaded_model_names().is_empty());
        assert!(models.guardrails.is_empty());
    }

    #[test]
    fn test_corrupt_artifact_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RQS_MODEL_FILE), b"{broken").unwrap();
        assert!(LoadedModels::load(dir.path()).is_err());
    }

    #[test]
    fn test_inconsistent_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), RQS_MODEL_FILE, &["a", "b"], &[1.0], 0.0);
        assert!(matches!(
            LoadedModels::load(dir.path()),
            Err(ScoringError::ArtifactInvalid(_))
        ));
    }

    #[test]
    fn test_paired_models_load() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), CTR_BASELINE_FILE, &["log_subs"], &[0.1], 0.0);
        write_model(dir.path(), CTR_RESIDUAL_FILE, &["brightness"], &[0.01], 0.0);
        std::fs::write(
            dir.path().join(GUARDRAILS_FILE),
            br#"{"gaming|2": 500000.0}"#,
        )
        .unwrap();

        let models = LoadedModels::load(dir.path()).unwrap();
        assert_eq!(models.loaded_model_names(), vec!["ctr"]);
        assert_eq!(models.guardrails.len(), 1);
    }

    #[test]
    fn test_half_of_a_pair_degrades() {
        let dir = tempfile::tempdir().unwrap();
        write_model(dir.path(), VIEWS_BASELINE_FILE, &["log_subs"], &[0.1], 0.0);
        let models = LoadedModels::load(dir.path()).unwrap();
        assert!(models.views.is_none());
    }
}
