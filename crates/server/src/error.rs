//! Query-time and enrichment errors.

use thiserror::Error;

/// Errors returned by a recommendation query.
///
/// Both are per-call and leave the model untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No catalog title matches, ignoring case
    #[error("'{title}' not found in the catalog")]
    NotFound { title: String },

    /// Several rows share the title and the policy forbids guessing
    #[error("'{title}' matches {matches} catalog entries")]
    AmbiguousTitle { title: String, matches: usize },
}

/// Why a poster lookup produced nothing.
///
/// These never escape `PosterClient::fetch_poster`; they are logged and the
/// result degrades to "no image".
#[derive(Error, Debug)]
pub enum EnrichmentFailure {
    #[error("Poster request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Poster service returned status {0}")]
    Status(u16),

    #[error("Invalid poster response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}
