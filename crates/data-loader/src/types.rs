//! Core domain types for the TMDB movie tables.
//!
//! Raw rows mirror the two CSV files column for column, with every cell kept
//! as an `Option<String>` so that nulls survive until the merge step decides
//! what to drop. `MovieRecord` is the normalized, typed form the feature
//! pipeline consumes.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (the TMDB `id` column)
pub type MovieId = u32;

// =============================================================================
// Raw table rows
// =============================================================================

/// One row of the movies table (`tmdb_5000_movies.csv`).
///
/// Only the columns the pipeline reads are declared; serde ignores the rest
/// (budget, homepage, popularity, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMovieRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub genres: Option<String>,
    pub keywords: Option<String>,
    pub overview: Option<String>,
}

/// One row of the credits table (`tmdb_5000_credits.csv`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCreditRow {
    pub movie_id: Option<String>,
    pub title: Option<String>,
    pub cast: Option<String>,
    pub crew: Option<String>,
}

/// A movies row joined with one credits row sharing its title.
///
/// `line` is the movies-file line the row came from, kept for error context.
#[derive(Debug, Clone, Default)]
pub struct MergedRow {
    pub line: usize,
    pub id: Option<String>,
    pub movie_id: Option<String>,
    pub title: Option<String>,
    pub genres: Option<String>,
    pub keywords: Option<String>,
    pub overview: Option<String>,
    pub cast: Option<String>,
    pub crew: Option<String>,
}

impl MergedRow {
    /// Join a movies row with a credits row.
    pub fn join(line: usize, movie: &RawMovieRow, credit: &RawCreditRow) -> Self {
        Self {
            line,
            id: movie.id.clone(),
            movie_id: credit.movie_id.clone(),
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            keywords: movie.keywords.clone(),
            overview: movie.overview.clone(),
            cast: credit.cast.clone(),
            crew: credit.crew.clone(),
        }
    }

    /// True when no merged column is null.
    ///
    /// Only empty cells parse as null; a whitespace-only cell is a value.
    pub fn is_complete(&self) -> bool {
        [
            &self.id,
            &self.movie_id,
            &self.title,
            &self.genres,
            &self.keywords,
            &self.overview,
            &self.cast,
            &self.crew,
        ]
        .iter()
        .all(|field| field.is_some())
    }
}

// =============================================================================
// Encoded-list schema
// =============================================================================

/// A `{"name": ...}` entry of the genres, keywords or cast lists.
///
/// Any other keys (`id`, `character`, `credit_id`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedEntry {
    pub name: String,
}

/// A crew entry; only `name` and `job` are part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrewEntry {
    pub name: String,
    pub job: String,
}

// =============================================================================
// Normalized record
// =============================================================================

/// A movie after metadata normalization.
///
/// Every token in the list fields is whitespace-free, so a multi-word name
/// such as "Tom Hanks" is carried as the single token "TomHanks".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    /// Top-billed cast, in billing order
    pub cast: Vec<String>,
    /// Zero or one entries
    pub director: Vec<String>,
    /// The synopsis split on whitespace, unstemmed
    pub overview_tokens: Vec<String>,
}

// =============================================================================
// Load options
// =============================================================================

/// What to do with a row whose encoded fields fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MalformedRowPolicy {
    /// Abort the whole build (static, pre-validated catalog)
    #[default]
    Fail,
    /// Drop the row and log a warning
    Skip,
}

/// Options for turning merged rows into `MovieRecord`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// How many top-billed cast members to keep
    pub cast_limit: usize,
    pub malformed_rows: MalformedRowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            cast_limit: 3,
            malformed_rows: MalformedRowPolicy::Fail,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The loaded, normalized catalog in row order.
///
/// Row order is significant: it is the row order of every matrix built from
/// this catalog, and the tie-break order for recommendations.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) records: Vec<MovieRecord>,
    pub(crate) stats: LoadStats,
}

/// Counters describing what happened during a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub movie_rows: usize,
    pub credit_rows: usize,
    pub merged_rows: usize,
    pub incomplete_rows: usize,
    pub malformed_rows: usize,
}

impl Catalog {
    /// Build a catalog directly from normalized records.
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let stats = LoadStats {
            merged_rows: records.len(),
            ..LoadStats::default()
        };
        Self { records, stats }
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
