//! Model scoring with guarded fallbacks.
//!
//! Each quantity is scored as baseline + residual, inverse-log-transformed
//! where the training target was log-scaled, and clamped to its documented
//! range. Any failure on the model path (missing artifact, stale feature
//! shape) degrades to a fixed heuristic and tags the result as a fallback
//! rather than failing the request.

use tracing::warn;

use ytperf_features::{assemble, SlotEmbeddings};
use ytperf_models::{Genre, ScoredValue, ThumbnailFeatures, VideoRequest};

use crate::artifact::{BaselineResidual, LoadedModels};
use crate::error::ScoringResult;

/// CTR bounds: floor at 1% of subscribers, allow up to 200% for viral
/// potential.
pub const CTR_MIN: f64 = 0.01;
pub const CTR_MAX: f64 = 2.0;

/// RQS model-path bounds.
pub const RQS_MIN: f64 = 10.0;
pub const RQS_MAX: f64 = 90.0;

/// Minimum plausible view count.
pub const VIEWS_FLOOR: f64 = 10.0;

/// Heuristic CTR when no model output is available.
pub const CTR_FALLBACK: f64 = 0.05;

/// Predict the views-per-subscriber ratio.
pub fn predict_ctr(
    models: &LoadedModels,
    request: &VideoRequest,
    thumbnail: &ThumbnailFeatures,
    embeddings: &SlotEmbeddings,
) -> ScoredValue {
    let Some(pair) = &models.ctr else {
        return ScoredValue::fallback(CTR_FALLBACK, "ctr artifacts not loaded");
    };

    match score_pair(pair, request, thumbnail, embeddings) {
        // Target is log1p(views/subs); invert before clamping.
        Ok(log_ctr) => ScoredValue::model(log_ctr.exp_m1().clamp(CTR_MIN, CTR_MAX)),
        Err(e) => {
            warn!("ctr model path failed, using fallback: {}", e);
            ScoredValue::fallback(CTR_FALLBACK, e.to_string())
        }
    }
}

/// Predict the retention quality score.
pub fn predict_rqs(
    models: &LoadedModels,
    request: &VideoRequest,
    thumbnail: &ThumbnailFeatures,
    embeddings: &SlotEmbeddings,
) -> ScoredValue {
    let Some(model) = &models.rqs else {
        // Thumbnail quality influences retention: sharper images and
        // visible faces raise the heuristic.
        let quality_boost = thumbnail.sharpness / 10.0;
        let face_boost = (thumbnail.face_area_percentage * 2.0).min(20.0);
        let value = (40.0 + quality_boost + face_boost).clamp(RQS_MIN, RQS_MAX);
        return ScoredValue::fallback(value, "rqs artifact not loaded");
    };

    let x = assemble(request, thumbnail, embeddings, &model.features);
    match model.predict(&x) {
        Ok(raw) => ScoredValue::model(raw.clamp(RQS_MIN, RQS_MAX)),
        Err(e) => {
            warn!("rqs model path failed, using fallback: {}", e);
            ScoredValue::fallback(50.0, e.to_string())
        }
    }
}

/// Predict the view count, consuming the CTR and RQS predictions as
/// engineered interaction features.
pub fn predict_views(
    models: &LoadedModels,
    request: &VideoRequest,
    ctr: f64,
    rqs: f64,
) -> ScoredValue {
    let subs = request.subscriber_count as f64;
    let fallback_views = (subs * ctr).max(VIEWS_FLOOR);

    let Some(pair) = &models.views else {
        return ScoredValue::fallback(fallback_views, "views artifacts not loaded");
    };

    match score_views_pair(pair, request, ctr, rqs) {
        Ok(log_views) => {
            let raw = log_views.exp_m1();
            let clamped = models
                .guardrails
                .clamp(request.genre, request.subscriber_count, raw);
            ScoredValue::model(clamped.max(VIEWS_FLOOR))
        }
        Err(e) => {
            warn!("views model path failed, using fallback: {}", e);
            ScoredValue::fallback(fallback_views, e.to_string())
        }
    }
}

fn score_pair(
    pair: &BaselineResidual,
    request: &VideoRequest,
    thumbnail: &ThumbnailFeatures,
    embeddings: &SlotEmbeddings,
) -> ScoringResult<f64> {
    let x_baseline = assemble(request, thumbnail, embeddings, &pair.baseline.features);
    let x_residual = assemble(request, thumbnail, embeddings, &pair.residual.features);
    Ok(pair.baseline.predict(&x_baseline)? + pair.residual.predict(&x_residual)?)
}

fn score_views_pair(
    pair: &BaselineResidual,
    request: &VideoRequest,
    ctr: f64,
    rqs: f64,
) -> ScoringResult<f64> {
    let subs = request.subscriber_count as f64;
    let log_subs = subs.ln_1p();
    let log_age = (request.age_days as f64).ln_1p();

    let x_baseline: Vec<f64> = pair
        .baseline
        .features
        .iter()
        .map(|name| baseline_value(name, request, log_subs, log_age))
        .collect();
    let baseline_pred = pair.baseline.predict(&x_baseline)?;

    let x_residual: Vec<f64> = pair
        .residual
        .features
        .iter()
        .map(|name| views_residual_value(name, request, ctr, rqs, log_subs, log_age))
        .collect();
    let x_residual = match &pair.scaler {
        Some(scaler) => scaler.transform(&x_residual)?,
        None => x_residual,
    };
    let residual_pred = pair.residual.predict(&x_residual)?;

    Ok(baseline_pred + residual_pred)
}

fn baseline_value(name: &str, request: &VideoRequest, log_subs: f64, log_age: f64) -> f64 {
    match name {
        "log_subs" => log_subs,
        "log_age" => log_age,
        "log_duration" => (request.duration_seconds as f64).ln_1p(),
        _ if name.starts_with("genre_") => genre_one_hot(name, request.genre),
        _ => 0.0,
    }
}

/// Engineered interaction features the views residual model was trained
/// on: products, squares and sigmoids of the upstream CTR/RQS predictions
/// alongside channel size and age.
fn views_residual_value(
    name: &str,
    request: &VideoRequest,
    ctr: f64,
    rqs: f64,
    log_subs: f64,
    log_age: f64,
) -> f64 {
    match name {
        "ctr_pred" => ctr,
        "ctr_pred_sq" => ctr * ctr,
        "ctr_pred_log" => ctr.max(0.0).ln_1p(),
        "rqs_pred" => rqs,
        "rqs_pred_sq" => (rqs / 100.0).powi(2),
        "rqs_pred_sigmoid" => 1.0 / (1.0 + (-(rqs - 50.0) / 10.0).exp()),
        "ctr_rqs_interaction" => ctr * (rqs / 100.0),
        "ctr_rqs_product" => (ctr * rqs / 100.0).max(0.0).sqrt(),
        "log_age" => log_age,
        "log_age_sq" => log_age * log_age,
        "log_subs" => log_subs,
        "ctr_subs_interaction" => ctr * log_subs,
        _ if name.starts_with("genre_") => genre_one_hot(name, request.genre),
        _ => 0.0,
    }
}

fn genre_one_hot(name: &str, genre: Genre) -> f64 {
    if name == genre.column_name() {
        1.0
    } else {
        0.0
    }
}
