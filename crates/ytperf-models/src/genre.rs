//! Content genre taxonomy.
//!
//! The genre set is fixed: it mirrors the categories the scoring models
//! were trained with, and feeds the one-hot `genre_*` feature columns.

use serde::{Deserialize, Serialize};

/// Content category of a video.
///
/// Unrecognized genre strings are corrected to [`Genre::Unknown`] rather
/// than rejected; see [`Genre::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Gaming,
    EducationScience,
    ChallengeStunts,
    Catholic,
    KidsFamily,
    Unknown,
}

impl Genre {
    /// All genres, in the order the one-hot training columns were laid out.
    pub const ALL: [Genre; 6] = [
        Genre::Unknown,
        Genre::Gaming,
        Genre::EducationScience,
        Genre::ChallengeStunts,
        Genre::Catholic,
        Genre::KidsFamily,
    ];

    /// The wire/training name of this genre (`genre_{name}` columns).
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Gaming => "gaming",
            Genre::EducationScience => "education_science",
            Genre::ChallengeStunts => "challenge_stunts",
            Genre::Catholic => "catholic",
            Genre::KidsFamily => "kids_family",
            Genre::Unknown => "unknown",
        }
    }

    /// Parse a genre string, returning `None` for anything outside the
    /// fixed valid set.
    pub fn parse(s: &str) -> Option<Genre> {
        match s {
            "gaming" => Some(Genre::Gaming),
            "education_science" => Some(Genre::EducationScience),
            "challenge_stunts" => Some(Genre::ChallengeStunts),
            "catholic" => Some(Genre::Catholic),
            "kids_family" => Some(Genre::KidsFamily),
            "unknown" => Some(Genre::Unknown),
            _ => None,
        }
    }

    /// Normalize a raw genre string to a known genre.
    ///
    /// Invalid input is corrected to [`Genre::Unknown`] and a warning
    /// message is returned alongside; valid input passes through with no
    /// warning. This never fails.
    pub fn normalize(raw: &str) -> (Genre, Option<String>) {
        match Genre::parse(raw.trim()) {
            Some(genre) => (genre, None),
            None => (
                Genre::Unknown,
                Some(format!(
                    "invalid genre '{}', substituted 'unknown'",
                    raw.trim()
                )),
            ),
        }
    }

    /// The one-hot column name for this genre.
    pub fn column_name(&self) -> String {
        format!("genre_{}", self.as_str())
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_genres() {
        assert_eq!(Genre::parse("gaming"), Some(Genre::Gaming));
        assert_eq!(Genre::parse("kids_family"), Some(Genre::KidsFamily));
        assert_eq!(Genre::parse("unknown"), Some(Genre::Unknown));
    }

    #[test]
    fn test_normalize_corrects_invalid_genre() {
        let (genre, warning) = Genre::normalize("not_a_real_genre");
        assert_eq!(genre, Genre::Unknown);
        let warning = warning.expect("invalid genre must produce a warning");
        assert!(warning.contains("not_a_real_genre"));
        assert!(warning.contains("unknown"));
    }

    #[test]
    fn test_normalize_valid_genre_has_no_warning() {
        let (genre, warning) = Genre::normalize("gaming");
        assert_eq!(genre, Genre::Gaming);
        assert!(warning.is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Genre::EducationScience).unwrap();
        assert_eq!(json, "\"education_science\"");
        let back: Genre = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Genre::EducationScience);
    }
}
