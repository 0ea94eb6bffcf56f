//! Tag building: one flat, lowercase text per movie.

use crate::traits::TokenNormalizer;
use data_loader::{MovieId, MovieRecord};
use serde::{Deserialize, Serialize};

/// A movie reduced to its normalized tag text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedMovie {
    pub id: MovieId,
    pub title: String,
    pub tag_text: String,
}

/// Concatenate overview, genres, cast, director and keywords (in that order),
/// join with single spaces and lowercase the result.
///
/// Tokens are not deduplicated across fields.
pub fn build_tag_text(record: &MovieRecord) -> String {
    record
        .overview_tokens
        .iter()
        .chain(&record.genres)
        .chain(&record.cast)
        .chain(&record.director)
        .chain(&record.keywords)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Build the pre-stem tag text and run it through `normalizer`.
pub fn tag_movie(record: &MovieRecord, normalizer: &dyn TokenNormalizer) -> TaggedMovie {
    TaggedMovie {
        id: record.id,
        title: record.title.clone(),
        tag_text: normalizer.normalize_text(&build_tag_text(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stemmer::{IdentityNormalizer, PorterStemmer};

    fn record() -> MovieRecord {
        MovieRecord {
            id: 7,
            title: "Test".to_string(),
            genres: vec!["Action".to_string(), "ScienceFiction".to_string()],
            keywords: vec!["spaceWar".to_string(), "Action".to_string()],
            cast: vec!["TomHanks".to_string()],
            director: vec!["JamesCameron".to_string()],
            overview_tokens: vec!["Heroes".to_string(), "Fight.".to_string()],
        }
    }

    #[test]
    fn test_field_order_and_lowercase() {
        assert_eq!(
            build_tag_text(&record()),
            "heroes fight. action sciencefiction tomhanks jamescameron spacewar action"
        );
    }

    #[test]
    fn test_empty_record_gives_empty_tag() {
        let empty = MovieRecord {
            genres: vec![],
            keywords: vec![],
            cast: vec![],
            director: vec![],
            overview_tokens: vec![],
            ..record()
        };
        assert_eq!(build_tag_text(&empty), "");
    }

    #[test]
    fn test_tag_movie_applies_normalizer() {
        let tagged = tag_movie(&record(), &PorterStemmer::new());
        assert_eq!(tagged.id, 7);
        assert_eq!(tagged.tag_text.split(' ').count(), 8);
        assert!(tagged.tag_text.contains("jamescameron"));

        let raw = tag_movie(&record(), &IdentityNormalizer);
        assert_eq!(raw.tag_text, build_tag_text(&record()));
    }
}
