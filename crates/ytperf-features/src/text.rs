//! Text feature / embedding generation.
//!
//! Each text slot (title, description, tags, thumbnail text) may have a
//! pre-fitted TF-IDF vectorizer saved next to the scoring artifacts. When
//! one exists it is applied; otherwise a small set of deterministic
//! statistical features stands in, zero-padded to the target width. Empty
//! text always yields an all-zero vector.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{FeatureError, FeatureResult};

/// Width of every embedding vector the assembler indexes into.
pub const EMBED_DIM: usize = 384;

/// Title words that correlate with click-seeking phrasing; counted by the
/// statistical fallback.
const ENGAGEMENT_WORDS: &[&str] = &[
    "amazing",
    "incredible",
    "unbelievable",
    "shocking",
    "secret",
    "ultimate",
    "best",
    "worst",
    "crazy",
    "insane",
    "epic",
    "viral",
    "must",
    "watch",
    "see",
    "new",
    "first",
    "last",
    "only",
];

/// A named text slot with its own saved vectorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedSlot {
    Title,
    Description,
    Tags,
    ThumbnailText,
}

impl EmbedSlot {
    pub const ALL: [EmbedSlot; 4] = [
        EmbedSlot::Title,
        EmbedSlot::Description,
        EmbedSlot::Tags,
        EmbedSlot::ThumbnailText,
    ];

    /// Feature-name prefix used in artifact column names
    /// (`title_embed_17`, `tags_embed_3`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            EmbedSlot::Title => "title",
            EmbedSlot::Description => "description",
            EmbedSlot::Tags => "tags",
            EmbedSlot::ThumbnailText => "thumbnail_text",
        }
    }

    /// File the slot's vectorizer is loaded from, relative to the
    /// artifact directory.
    pub fn vectorizer_file(&self) -> String {
        format!("{}_vectorizer.json", self.prefix())
    }
}

/// A pre-fitted TF-IDF vocabulary with per-term idf weights.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn from_path(path: &Path) -> FeatureResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let vectorizer: TfidfVectorizer =
            serde_json::from_str(&raw).map_err(|source| FeatureError::VectorizerParse {
                path: path.display().to_string(),
                source,
            })?;
        for (term, &idx) in &vectorizer.vocabulary {
            if idx >= vectorizer.idf.len() {
                return Err(FeatureError::VectorizerInvalid(format!(
                    "term '{}' maps to index {} but idf has {} entries",
                    term,
                    idx,
                    vectorizer.idf.len()
                )));
            }
        }
        Ok(vectorizer)
    }

    /// Transform text into an l2-normalized tf-idf vector, truncated or
    /// zero-padded to `n`.
    pub fn transform(&self, text: &str, n: usize) -> Vec<f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = vec![0.0; self.idf.len()];
        for (idx, count) in counts {
            vector[idx] = count * self.idf[idx];
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector.resize(n, 0.0);
        vector
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Per-slot embedding generator with statistical fallback.
pub struct TextEmbedder {
    vectorizers: HashMap<EmbedSlot, TfidfVectorizer>,
}

impl TextEmbedder {
    /// Load whatever slot vectorizers exist under `dir`.
    ///
    /// A missing file leaves that slot on the statistical fallback; a file
    /// that exists but does not parse is an error.
    pub fn load(dir: &Path) -> FeatureResult<Self> {
        let mut vectorizers = HashMap::new();
        for slot in EmbedSlot::ALL {
            let path = dir.join(slot.vectorizer_file());
            if !path.exists() {
                debug!("no vectorizer for slot '{}', using fallback", slot.prefix());
                continue;
            }
            let vectorizer = TfidfVectorizer::from_path(&path)?;
            warn_if_tiny(&vectorizer, slot);
            vectorizers.insert(slot, vectorizer);
        }
        Ok(Self { vectorizers })
    }

    /// An embedder with no saved vectorizers; every slot falls back to
    /// statistical features.
    pub fn empty() -> Self {
        Self {
            vectorizers: HashMap::new(),
        }
    }

    /// Slots with a loaded vectorizer, by prefix name.
    pub fn loaded_slots(&self) -> Vec<&'static str> {
        let mut slots: Vec<&'static str> = self.vectorizers.keys().map(|s| s.prefix()).collect();
        slots.sort_unstable();
        slots
    }

    /// Embed `text` for `slot` into exactly `n` values.
    pub fn embed(&self, slot: EmbedSlot, text: &str, n: usize) -> Vec<f64> {
        if text.trim().is_empty() {
            return vec![0.0; n];
        }
        match self.vectorizers.get(&slot) {
            Some(vectorizer) => vectorizer.transform(text, n),
            None => statistical_features(text, n),
        }
    }
}

fn warn_if_tiny(vectorizer: &TfidfVectorizer, slot: EmbedSlot) {
    if vectorizer.vocabulary.len() < 8 {
        warn!(
            "vectorizer for slot '{}' has only {} terms",
            slot.prefix(),
            vectorizer.vocabulary.len()
        );
    }
}

/// Deterministic statistical stand-in for a missing vectorizer: character
/// and word counts, punctuation counts, capitalization ratio, digit count
/// and engagement-word count, squashed to [0, 1] and zero-padded.
fn statistical_features(text: &str, n: usize) -> Vec<f64> {
    let char_count = text.chars().count() as f64;
    let word_count = text.split_whitespace().count() as f64;
    let exclamations = text.matches('!').count() as f64;
    let questions = text.matches('?').count() as f64;
    let letters = text.chars().filter(|c| c.is_alphabetic()).count() as f64;
    let caps = text.chars().filter(|c| c.is_uppercase()).count() as f64;
    let caps_ratio = if letters > 0.0 { caps / letters } else { 0.0 };
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count() as f64;

    let lower = text.to_lowercase();
    let engagement = ENGAGEMENT_WORDS
        .iter()
        .filter(|w| lower.contains(*w))
        .count() as f64;

    let mut vector = vec![
        (char_count / 100.0).min(1.0),
        (word_count / 20.0).min(1.0),
        (exclamations / 5.0).min(1.0),
        (questions / 5.0).min(1.0),
        caps_ratio,
        (digits / 5.0).min(1.0),
        (engagement / 8.0).min(1.0),
    ];
    vector.resize(n, 0.0);
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = TextEmbedder::empty();
        let vector = embedder.embed(EmbedSlot::Title, "   ", 16);
        assert_eq!(vector, vec![0.0; 16]);
    }

    #[test]
    fn test_fallback_is_deterministic_and_padded() {
        let embedder = TextEmbedder::empty();
        let a = embedder.embed(EmbedSlot::Title, "EPIC MINECRAFT BUILD CHALLENGE!", 32);
        let b = embedder.embed(EmbedSlot::Title, "EPIC MINECRAFT BUILD CHALLENGE!", 32);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        // Engagement word "epic" and the exclamation mark both register.
        assert!(a[2] > 0.0);
        assert!(a[6] > 0.0);
        // Padding is zero.
        assert!(a[7..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tfidf_transform() {
        let vectorizer = TfidfVectorizer {
            vocabulary: HashMap::from([
                ("minecraft".to_string(), 0),
                ("build".to_string(), 1),
                ("cooking".to_string(), 2),
            ]),
            idf: vec![1.0, 2.0, 3.0],
        };
        let vector = vectorizer.transform("Minecraft build build", 5);
        assert_eq!(vector.len(), 5);
        // build (tf=2, idf=2) outweighs minecraft (tf=1, idf=1).
        assert!(vector[1] > vector[0]);
        assert_eq!(vector[2], 0.0);
        // l2 normalized.
        let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_loads_vectorizer_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("title_vectorizer.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"vocabulary": {{"hello": 0, "world": 1}}, "idf": [1.0, 1.5]}}"#
        )
        .unwrap();

        let embedder = TextEmbedder::load(dir.path()).unwrap();
        assert_eq!(embedder.loaded_slots(), vec!["title"]);

        let vector = embedder.embed(EmbedSlot::Title, "hello world", 4);
        assert!(vector[0] > 0.0 && vector[1] > 0.0);
    }

    #[test]
    fn test_corrupt_vectorizer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tags_vectorizer.json"), b"{not json").unwrap();
        assert!(TextEmbedder::load(dir.path()).is_err());
    }

    #[test]
    fn test_bad_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("title_vectorizer.json"),
            br#"{"vocabulary": {"oops": 9}, "idf": [1.0]}"#,
        )
        .unwrap();
        assert!(TextEmbedder::load(dir.path()).is_err());
    }
}
