//! View-count guardrails.
//!
//! A static table mapping `"{genre}|{bucket}"` to the maximum plausible
//! view count for that content category and channel size. Used only to
//! clamp the views model's raw output, never to raise it.

use std::collections::HashMap;

use serde::Deserialize;

use ytperf_models::Genre;

/// Subscriber-count bucket boundaries on the log1p scale
/// (roughly 1K / 10K / 100K / 1M subscribers).
const BUCKET_THRESHOLDS: [f64; 4] = [6.9, 9.2, 11.5, 13.8];

/// Maximum-views lookup table keyed by genre and subscriber bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct GuardrailTable {
    entries: HashMap<String, f64>,
}

impl GuardrailTable {
    /// Bucket index for a subscriber count, 0-4.
    pub fn subscriber_bucket(subscriber_count: u64) -> usize {
        let log_subs = (subscriber_count as f64).ln_1p();
        BUCKET_THRESHOLDS
            .iter()
            .position(|&t| log_subs < t)
            .unwrap_or(BUCKET_THRESHOLDS.len())
    }

    /// Recorded maximum views for this genre and channel size, if any.
    pub fn max_views(&self, genre: Genre, subscriber_count: u64) -> Option<f64> {
        let key = format!("{}|{}", genre, Self::subscriber_bucket(subscriber_count));
        self.entries.get(&key).copied()
    }

    /// Clamp a raw views prediction to the table's ceiling when one exists.
    pub fn clamp(&self, genre: Genre, subscriber_count: u64, views: f64) -> f64 {
        match self.max_views(genre, subscriber_count) {
            Some(max) => views.min(max),
            None => views,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for GuardrailTable {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(GuardrailTable::subscriber_bucket(0), 0);
        assert_eq!(GuardrailTable::subscriber_bucket(500), 0);
        // ln(1001) ~ 6.91, just over the first threshold.
        assert_eq!(GuardrailTable::subscriber_bucket(1_000), 1);
        assert_eq!(GuardrailTable::subscriber_bucket(50_000), 2);
        assert_eq!(GuardrailTable::subscriber_bucket(500_000), 3);
        assert_eq!(GuardrailTable::subscriber_bucket(10_000_000), 4);
    }

    #[test]
    fn test_clamp_applies_ceiling() {
        let table: GuardrailTable =
            [("gaming|2".to_string(), 250_000.0)].into_iter().collect();
        assert_eq!(table.clamp(Genre::Gaming, 50_000, 1_000_000.0), 250_000.0);
        assert_eq!(table.clamp(Genre::Gaming, 50_000, 100_000.0), 100_000.0);
        // No entry for this genre/bucket: untouched.
        assert_eq!(table.clamp(Genre::Catholic, 50_000, 1_000_000.0), 1_000_000.0);
    }

    #[test]
    fn test_deserializes_flat_map() {
        let table: GuardrailTable =
            serde_json::from_str(r#"{"gaming|1": 50000.0, "unknown|0": 2000.0}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.max_views(Genre::Unknown, 100), Some(2000.0));
    }
}
