//! Parser for the TMDB CSV tables.
//!
//! - movies:  id, title, genres, keywords, overview (+ columns we ignore)
//! - credits: movie_id, title, cast, crew
//!
//! The header row is checked up front so a missing column is reported by
//! name instead of as a per-row deserialization failure.

use crate::error::{DataIntegrityError, Result};
use crate::types::{RawCreditRow, RawMovieRow};
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;

/// Columns the movies table must provide
pub const MOVIE_COLUMNS: [&str; 5] = ["id", "title", "genres", "keywords", "overview"];

/// Columns the credits table must provide
pub const CREDIT_COLUMNS: [&str; 4] = ["movie_id", "title", "cast", "crew"];

/// A parsed row together with the file line it started on
pub type Numbered<T> = (usize, T);

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_columns(headers: &StringRecord, required: &[&str], file: &str) -> Result<()> {
    for column in required {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(DataIntegrityError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Treat empty cells as nulls. Whitespace-only cells are kept as values.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn read_table<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<Numbered<T>>> {
    let file = file_label(path);
    let handle = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataIntegrityError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataIntegrityError::IoError(e),
    })?;

    let mut reader = ReaderBuilder::new().flexible(false).from_reader(handle);
    let csv_error = |source: csv::Error| DataIntegrityError::CsvError {
        file: file.clone(),
        source,
    };

    let headers = reader.headers().map_err(csv_error)?.clone();
    check_columns(&headers, required, &file)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let row: T = record.deserialize(Some(&headers)).map_err(csv_error)?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Parse the movies table
pub fn parse_movies(path: &Path) -> Result<Vec<Numbered<RawMovieRow>>> {
    let rows = read_table::<RawMovieRow>(path, &MOVIE_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|(line, row)| {
            (
                line,
                RawMovieRow {
                    id: blank_to_none(row.id),
                    title: blank_to_none(row.title),
                    genres: blank_to_none(row.genres),
                    keywords: blank_to_none(row.keywords),
                    overview: blank_to_none(row.overview),
                },
            )
        })
        .collect())
}

/// Parse the credits table
pub fn parse_credits(path: &Path) -> Result<Vec<Numbered<RawCreditRow>>> {
    let rows = read_table::<RawCreditRow>(path, &CREDIT_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|(line, row)| {
            (
                line,
                RawCreditRow {
                    movie_id: blank_to_none(row.movie_id),
                    title: blank_to_none(row.title),
                    cast: blank_to_none(row.cast),
                    crew: blank_to_none(row.crew),
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_movies_with_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "movies.csv",
            "budget,genres,id,keywords,overview,title\n\
             237000000,\"[{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}]\",19995,[],\"A marine, on a moon.\",Avatar\n",
        );

        let rows = parse_movies(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let (line, row) = &rows[0];
        assert_eq!(*line, 2);
        assert_eq!(row.id.as_deref(), Some("19995"));
        assert_eq!(row.title.as_deref(), Some("Avatar"));
        assert_eq!(row.overview.as_deref(), Some("A marine, on a moon."));
        assert_eq!(row.genres.as_deref(), Some(r#"[{"id": 28, "name": "Action"}]"#));
    }

    #[test]
    fn test_blank_cells_become_none() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "movies.csv",
            "id,title,genres,keywords,overview\n1,Quiet,[],[],\n",
        );

        let rows = parse_movies(&path).unwrap();
        assert!(rows[0].1.overview.is_none());
    }

    #[test]
    fn test_whitespace_cell_is_not_null() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "movies.csv",
            "id,title,genres,keywords,overview\n1,Quiet,[],[],\"   \"\n",
        );

        let rows = parse_movies(&path).unwrap();
        assert_eq!(rows[0].1.overview.as_deref(), Some("   "));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "credits.csv",
            "movie_id,title,cast,crew\n1,A,[],[]\n2,B,[],[],extra\n",
        );

        let err = parse_credits(&path).unwrap_err();
        assert!(
            matches!(err, DataIntegrityError::CsvError { ref file, .. } if file == "credits.csv"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "credits.csv", "movie_id,title,cast\n1,A,[]\n");

        let err = parse_credits(&path).unwrap_err();
        match err {
            DataIntegrityError::MissingColumn { column, file } => {
                assert_eq!(column, "crew");
                assert_eq!(file, "credits.csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_movies(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataIntegrityError::FileNotFound { .. }));
    }
}
