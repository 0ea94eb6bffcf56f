//! Metadata normalization: merged raw rows into `MovieRecord`s.
//!
//! ## Rules
//! - genres / keywords: every `name`, in order
//! - cast: the first `cast_limit` names in billing order
//! - crew: the first "Director", or nothing
//! - overview: split on whitespace, no stemming
//! - every list token has its internal whitespace removed, so the tag
//!   builder's space join cannot split a multi-word name

use crate::encoded;
use crate::error::{DataIntegrityError, Result};
use crate::types::{LoadOptions, MergedRow, MovieId, MovieRecord};

/// Remove all whitespace from a token ("Tom Hanks" -> "TomHanks").
pub fn strip_whitespace(token: &str) -> String {
    token.chars().filter(|c| !c.is_whitespace()).collect()
}

fn strip_all(tokens: Vec<String>) -> Vec<String> {
    tokens.iter().map(|t| strip_whitespace(t)).collect()
}

/// Normalize one merged row.
///
/// The caller is expected to have dropped incomplete rows already; a missing
/// field reaching this point is still reported rather than panicking.
pub fn normalize_row(row: &MergedRow, file: &str, options: &LoadOptions) -> Result<MovieRecord> {
    let malformed = |field: &str, reason: String| DataIntegrityError::MalformedField {
        file: file.to_string(),
        line: row.line,
        field: field.to_string(),
        reason,
    };
    let required = |value: &Option<String>, field: &str| -> Result<String> {
        value
            .clone()
            .ok_or_else(|| malformed(field, "missing value".to_string()))
    };

    let raw_id = required(&row.id, "id")?;
    let id: MovieId = raw_id
        .trim()
        .parse()
        .map_err(|e| malformed("id", format!("Invalid movie id '{}': {}", raw_id, e)))?;

    let title = required(&row.title, "title")?;

    let genres = encoded::parse_names(&required(&row.genres, "genres")?)
        .map_err(|e| malformed("genres", e.to_string()))?;
    let keywords = encoded::parse_names(&required(&row.keywords, "keywords")?)
        .map_err(|e| malformed("keywords", e.to_string()))?;
    let cast = encoded::parse_top_names(&required(&row.cast, "cast")?, options.cast_limit)
        .map_err(|e| malformed("cast", e.to_string()))?;
    let director = encoded::parse_director(&required(&row.crew, "crew")?)
        .map_err(|e| malformed("crew", e.to_string()))?;

    let overview_tokens = required(&row.overview, "overview")?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    Ok(MovieRecord {
        id,
        title,
        genres: strip_all(genres),
        keywords: strip_all(keywords),
        cast: strip_all(cast),
        director: director.map(|d| strip_whitespace(&d)).into_iter().collect(),
        overview_tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> MergedRow {
        MergedRow {
            line: 2,
            id: Some("19995".to_string()),
            movie_id: Some("19995".to_string()),
            title: Some("Avatar".to_string()),
            genres: Some(r#"[{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]"#.to_string()),
            keywords: Some(r#"[{"id": 1463, "name": "culture clash"}, {"id": 2964, "name": "future"}]"#.to_string()),
            overview: Some("In the 22nd century,  a paraplegic Marine".to_string()),
            cast: Some(r#"[{"name": "Sam Worthington"}, {"name": "Zoe Saldana"}, {"name": "Sigourney Weaver"}, {"name": "Stephen Lang"}]"#.to_string()),
            crew: Some(r#"[{"job": "Editor", "name": "John Refoua"}, {"job": "Director", "name": "James Cameron"}]"#.to_string()),
        }
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace("Tom Hanks"), "TomHanks");
        assert_eq!(strip_whitespace(" Science\tFiction "), "ScienceFiction");
        assert_eq!(strip_whitespace("Drama"), "Drama");
    }

    #[test]
    fn test_normalize_row() {
        let record = normalize_row(&sample_row(), "movies.csv", &LoadOptions::default()).unwrap();

        assert_eq!(record.id, 19995);
        assert_eq!(record.title, "Avatar");
        assert_eq!(record.genres, vec!["Action", "ScienceFiction"]);
        assert_eq!(record.keywords, vec!["cultureclash", "future"]);
        assert_eq!(record.cast, vec!["SamWorthington", "ZoeSaldana", "SigourneyWeaver"]);
        assert_eq!(record.director, vec!["JamesCameron"]);
        assert_eq!(
            record.overview_tokens,
            vec!["In", "the", "22nd", "century,", "a", "paraplegic", "Marine"]
        );
    }

    #[test]
    fn test_cast_limit_is_configurable() {
        let options = LoadOptions {
            cast_limit: 1,
            ..LoadOptions::default()
        };
        let record = normalize_row(&sample_row(), "movies.csv", &options).unwrap();
        assert_eq!(record.cast, vec!["SamWorthington"]);
    }

    #[test]
    fn test_no_director() {
        let mut row = sample_row();
        row.crew = Some("[]".to_string());
        let record = normalize_row(&row, "movies.csv", &LoadOptions::default()).unwrap();
        assert!(record.director.is_empty());
    }

    #[test]
    fn test_malformed_field_reports_context() {
        let mut row = sample_row();
        row.keywords = Some("[{'name': 'python literal'}]".to_string());

        let err = normalize_row(&row, "movies.csv", &LoadOptions::default()).unwrap_err();
        match err {
            DataIntegrityError::MalformedField { field, line, .. } => {
                assert_eq!(field, "keywords");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_id() {
        let mut row = sample_row();
        row.id = Some("abc".to_string());
        let err = normalize_row(&row, "movies.csv", &LoadOptions::default()).unwrap_err();
        match err {
            DataIntegrityError::MalformedField { field, line, .. } => {
                assert_eq!(field, "id");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_whitespace_overview_gives_no_tokens() {
        let mut row = sample_row();
        row.overview = Some("  \t ".to_string());
        let record = normalize_row(&row, "movies.csv", &LoadOptions::default()).unwrap();
        assert!(record.overview_tokens.is_empty());
    }
}
