//! Error types for the data-loader crate.
//!
//! Every failure here is a build-time data integrity problem: the catalog is
//! static, so none of these are retried and no partial catalog is produced.

use thiserror::Error;

/// Errors that can occur while loading, merging and normalizing the tables
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum DataIntegrityError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the file
    #[error("CSV error in {file}: {source}")]
    CsvError {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A column the pipeline depends on is absent from the header row
    #[error("Missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// An encoded list-of-objects field did not match its schema
    ///
    /// This variant stores context about where the error occurred
    #[error("Malformed {field} at line {line} in {file}: {reason}")]
    MalformedField {
        file: String,
        line: usize,
        field: String,
        reason: String,
    },

    /// Joining the two tables on title left nothing to build from
    #[error("Merging {movies} movie rows with {credits} credit rows produced no usable rows")]
    EmptyCatalog { movies: usize, credits: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataIntegrityError>;
