//! Recommended upload tags.

use ytperf_models::Genre;

/// Base tag bank per genre.
fn tag_bank(genre: Genre) -> &'static [&'static str] {
    match genre {
        Genre::Gaming => &[
            "gaming",
            "gameplay",
            "walkthrough",
            "review",
            "tutorial",
            "stream",
            "multiplayer",
            "strategy",
            "tips",
            "tricks",
        ],
        Genre::EducationScience => &[
            "education",
            "science",
            "learning",
            "tutorial",
            "explained",
            "research",
            "facts",
            "analysis",
            "study",
            "knowledge",
        ],
        Genre::ChallengeStunts => &[
            "challenge",
            "stunt",
            "experiment",
            "test",
            "reaction",
            "viral",
            "trending",
            "epic",
            "crazy",
            "attempt",
        ],
        Genre::Catholic => &[
            "catholic",
            "christian",
            "faith",
            "prayer",
            "sermon",
            "gospel",
            "church",
            "spiritual",
            "religious",
            "holy",
        ],
        Genre::KidsFamily => &[
            "kids",
            "family",
            "children",
            "fun",
            "educational",
            "playtime",
            "cartoon",
            "learning",
            "songs",
            "stories",
        ],
        Genre::Unknown => &[
            "entertainment",
            "lifestyle",
            "vlog",
            "fun",
            "creative",
            "popular",
            "trending",
            "new",
            "original",
            "unique",
        ],
    }
}

/// Generate up to 10 recommended tags from the genre bank, title keywords
/// and channel size. Deterministic for identical input.
pub fn generate_recommended_tags(title: &str, genre: Genre, subscriber_count: u64) -> Vec<String> {
    let mut tags: Vec<String> = tag_bank(genre)[..5].iter().map(|t| t.to_string()).collect();

    // Relevant title keywords: words longer than 3 characters, first 3.
    let keywords = title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| w.len() > 3)
        .take(3);
    for keyword in keywords {
        if !tags.contains(&keyword) {
            tags.push(keyword);
        }
    }

    if subscriber_count > 1_000_000 {
        tags.push("viral".to_string());
    } else if subscriber_count > 100_000 {
        tags.push("popular".to_string());
    }

    tags.truncate(10);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_bank_leads() {
        let tags = generate_recommended_tags("Hi", Genre::Gaming, 0);
        assert_eq!(&tags[..5], &["gaming", "gameplay", "walkthrough", "review", "tutorial"]);
    }

    #[test]
    fn test_title_keywords_and_tier() {
        let tags =
            generate_recommended_tags("EPIC MINECRAFT BUILD CHALLENGE!", Genre::Gaming, 2_000_000);
        assert!(tags.contains(&"minecraft".to_string()));
        assert!(tags.contains(&"epic".to_string()));
        assert!(tags.contains(&"viral".to_string()));
        assert!(tags.len() <= 10);
    }

    #[test]
    fn test_no_duplicate_keyword_tags() {
        let tags = generate_recommended_tags("gaming gaming gaming", Genre::Gaming, 0);
        assert_eq!(tags.iter().filter(|t| *t == "gaming").count(), 1);
    }
}
