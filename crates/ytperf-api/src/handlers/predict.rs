//! Prediction endpoint.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use ytperf_models::{Genre, PredictionResult};
use ytperf_scoring::PredictionInput;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Echo of the parsed request fields, returned alongside the prediction.
#[derive(Serialize)]
pub struct InputData {
    pub title: String,
    pub genre: String,
    pub subscriber_count: u64,
    pub has_thumbnail: bool,
    pub prediction_date: String,
}

#[derive(Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub prediction: PredictionResult,
    pub input_data: InputData,
}

/// Multipart form fields accepted by `POST /api/predict`.
#[derive(Default)]
struct PredictForm {
    title: Option<String>,
    genre: Option<String>,
    subscriber_count: Option<u64>,
    duration_seconds: Option<u64>,
    thumbnail: Option<Vec<u8>>,
}

impl PredictForm {
    /// Pull fields out of the multipart stream. Unknown fields are ignored.
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(|n| n.to_string()) else {
                continue;
            };

            match name.as_str() {
                "title" => form.title = Some(Self::text(field, &name).await?),
                "genre" => form.genre = Some(Self::text(field, &name).await?),
                "subscriber_count" => {
                    form.subscriber_count = Some(Self::number(field, &name).await?)
                }
                "duration_seconds" => {
                    form.duration_seconds = Some(Self::number(field, &name).await?)
                }
                "thumbnail" => {
                    let bytes = field.bytes().await.map_err(|e| {
                        ApiError::bad_request(format!("failed to read thumbnail: {e}"))
                    })?;
                    if !bytes.is_empty() {
                        form.thumbnail = Some(bytes.to_vec());
                    }
                }
                other => {
                    warn!(field = other, "ignoring unknown form field");
                }
            }
        }

        Ok(form)
    }

    async fn text(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
        field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read field '{name}': {e}")))
    }

    async fn number(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<u64> {
        let raw = Self::text(field, name).await?;
        raw.trim()
            .parse()
            .map_err(|_| ApiError::bad_request(format!("field '{name}' must be a non-negative integer, got '{raw}'")))
    }

    fn require(self) -> ApiResult<(String, String, u64, Option<u64>, Option<Vec<u8>>)> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("field 'title' is required"))?;
        let genre = self
            .genre
            .ok_or_else(|| ApiError::bad_request("field 'genre' is required"))?;
        let subscriber_count = self
            .subscriber_count
            .ok_or_else(|| ApiError::bad_request("field 'subscriber_count' is required"))?;
        Ok((
            title,
            genre,
            subscriber_count,
            self.duration_seconds,
            self.thumbnail,
        ))
    }
}

/// Predict performance for a video from its metadata and optional thumbnail.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<PredictResponse>> {
    let form = PredictForm::from_multipart(multipart).await?;
    let (title, genre, subscriber_count, duration_seconds, thumbnail) = form.require()?;

    let has_thumbnail = thumbnail.is_some();
    // Echo the corrected genre, matching what was actually scored.
    let (normalized_genre, _) = Genre::normalize(&genre);
    let input = PredictionInput {
        title: title.clone(),
        genre,
        subscriber_count,
        duration_seconds,
        thumbnail,
    };

    let start = Instant::now();
    let prediction = state.predictor.predict(input).await;
    let duration = start.elapsed().as_secs_f64();

    metrics::record_prediction(normalized_genre.as_str(), duration);
    for (stage, source) in [
        ("ctr", &prediction.sources.ctr),
        ("rqs", &prediction.sources.rqs),
        ("views", &prediction.sources.views),
    ] {
        if !source.is_model() {
            metrics::record_prediction_fallback(stage);
        }
    }

    info!(
        views = prediction.predicted_views,
        rqs = prediction.predicted_rqs,
        ctr = prediction.predicted_ctr,
        duration_ms = (duration * 1000.0) as u64,
        "prediction completed"
    );

    Ok(Json(PredictResponse {
        prediction,
        input_data: InputData {
            title,
            genre: normalized_genre.as_str().to_string(),
            subscriber_count,
            has_thumbnail,
            prediction_date: Utc::now().to_rfc3339(),
        },
    }))
}
