//! Catalog building: load both tables, join on title, normalize.
//!
//! Steps:
//! 1. Parse the movies and credits tables (in parallel)
//! 2. Inner-join on title
//! 3. Drop rows with a missing required field
//! 4. Normalize the remaining rows into `MovieRecord`s
//! 5. Refuse to produce an empty catalog

use crate::error::{DataIntegrityError, Result};
use crate::normalize::normalize_row;
use crate::parser::{self, Numbered};
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Default file name of the movies table inside a data directory
pub const MOVIES_FILE: &str = "tmdb_5000_movies.csv";

/// Default file name of the credits table inside a data directory
pub const CREDITS_FILE: &str = "tmdb_5000_credits.csv";

/// Inner join of the two tables on the exact title string.
///
/// Every movies row, in file order, yields one merged row per credits row
/// with the same title, in credits file order. Rows with no title never match.
pub fn merge_on_title(
    movies: &[Numbered<RawMovieRow>],
    credits: &[Numbered<RawCreditRow>],
) -> Vec<MergedRow> {
    let mut by_title: HashMap<&str, Vec<&RawCreditRow>> = HashMap::new();
    for (_, credit) in credits {
        if let Some(title) = credit.title.as_deref() {
            by_title.entry(title).or_default().push(credit);
        }
    }

    let mut merged = Vec::new();
    for (line, movie) in movies {
        let Some(title) = movie.title.as_deref() else {
            continue;
        };
        if let Some(matches) = by_title.get(title) {
            merged.extend(matches.iter().map(|credit| MergedRow::join(*line, movie, credit)));
        }
    }
    merged
}

impl Catalog {
    /// Load the catalog from a directory holding the two default file names
    pub fn load_from_dir(data_dir: &Path, options: &LoadOptions) -> Result<Self> {
        Self::load_from_files(
            &data_dir.join(MOVIES_FILE),
            &data_dir.join(CREDITS_FILE),
            options,
        )
    }

    /// Load the catalog from explicit table paths
    #[instrument(skip(options), fields(movies = %movies_path.display(), credits = %credits_path.display()))]
    pub fn load_from_files(
        movies_path: &Path,
        credits_path: &Path,
        options: &LoadOptions,
    ) -> Result<Self> {
        // Rayon's `join` runs both parsers in parallel
        let (movies, credits) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_credits(credits_path),
        );
        let movies = movies?;
        let credits = credits?;

        info!("Read {} movie rows and {} credit rows", movies.len(), credits.len());

        let label = movies_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| MOVIES_FILE.to_string());
        Self::from_tables(&movies, &credits, &label, options)
    }

    /// Build the catalog from already-parsed tables
    pub fn from_tables(
        movies: &[Numbered<RawMovieRow>],
        credits: &[Numbered<RawCreditRow>],
        file_label: &str,
        options: &LoadOptions,
    ) -> Result<Self> {
        let merged = merge_on_title(movies, credits);
        let mut stats = LoadStats {
            movie_rows: movies.len(),
            credit_rows: credits.len(),
            merged_rows: merged.len(),
            ..LoadStats::default()
        };

        let mut records = Vec::with_capacity(merged.len());
        for row in &merged {
            if !row.is_complete() {
                stats.incomplete_rows += 1;
                continue;
            }
            match normalize_row(row, file_label, options) {
                Ok(record) => records.push(record),
                Err(err) => match options.malformed_rows {
                    MalformedRowPolicy::Fail => return Err(err),
                    MalformedRowPolicy::Skip => {
                        warn!("Skipping row: {}", err);
                        stats.malformed_rows += 1;
                    }
                },
            }
        }

        if records.is_empty() {
            return Err(DataIntegrityError::EmptyCatalog {
                movies: movies.len(),
                credits: credits.len(),
            });
        }

        info!(
            "Catalog built: {} merged rows, {} dropped as incomplete, {} skipped as malformed, {} kept",
            stats.merged_rows,
            stats.incomplete_rows,
            stats.malformed_rows,
            records.len()
        );
        Ok(Self { records, stats })
    }
}
