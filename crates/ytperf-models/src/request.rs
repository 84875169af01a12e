//! Prediction request model.

use serde::{Deserialize, Serialize};

use crate::genre::Genre;

/// Default assumed duration when the caller does not provide one.
pub const DEFAULT_DURATION_SECONDS: u64 = 300;

/// A single prediction request, constructed per HTTP call and discarded
/// after the response is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Planned video title.
    pub title: String,
    /// Normalized content genre.
    pub genre: Genre,
    /// Channel subscriber count at prediction time.
    pub subscriber_count: u64,
    /// Planned duration; defaults to [`DEFAULT_DURATION_SECONDS`].
    pub duration_seconds: u64,
    /// Video age in days. Zero for a not-yet-published video.
    pub age_days: u64,
    /// Raw thumbnail bytes, when a thumbnail was uploaded.
    #[serde(skip)]
    pub thumbnail: Option<Vec<u8>>,
}

impl VideoRequest {
    /// Build a request for a planned (unpublished) video.
    pub fn new(title: impl Into<String>, genre: Genre, subscriber_count: u64) -> Self {
        Self {
            title: title.into(),
            genre,
            subscriber_count,
            duration_seconds: DEFAULT_DURATION_SECONDS,
            age_days: 0,
            thumbnail: None,
        }
    }

    pub fn with_duration(mut self, duration_seconds: u64) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    pub fn with_thumbnail(mut self, bytes: Vec<u8>) -> Self {
        self.thumbnail = Some(bytes);
        self
    }

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    pub fn title_length(&self) -> usize {
        self.title.chars().count()
    }

    pub fn title_word_count(&self) -> usize {
        self.title.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = VideoRequest::new("Test", Genre::Gaming, 1000);
        assert_eq!(req.duration_seconds, DEFAULT_DURATION_SECONDS);
        assert_eq!(req.age_days, 0);
        assert!(!req.has_thumbnail());
    }

    #[test]
    fn test_title_metrics() {
        let req = VideoRequest::new("EPIC MINECRAFT BUILD CHALLENGE!", Genre::Gaming, 100_000);
        assert_eq!(req.title_length(), 31);
        assert_eq!(req.title_word_count(), 4);
    }
}
