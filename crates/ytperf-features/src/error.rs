//! Feature extraction error types.

use thiserror::Error;

pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("vectorizer read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("vectorizer parse failed ({path}): {source}")]
    VectorizerParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("vectorizer is inconsistent: {0}")]
    VectorizerInvalid(String),
}
