//! # Data Loader Crate
//!
//! This crate loads the TMDB 5000 movie and credit tables and turns them into
//! a normalized, ordered `Catalog` of `MovieRecord`s.
//!
//! ## Main Components
//!
//! - **types**: Raw rows, the normalized `MovieRecord`, load options, `Catalog`
//! - **parser**: Read the CSV tables and check their headers
//! - **encoded**: Schema-validated parsing of the JSON list columns
//! - **normalize**: Raw row -> `MovieRecord` (names, top cast, director)
//! - **catalog**: Title join, null-row drop and the catalog build
//! - **error**: `DataIntegrityError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Catalog, LoadOptions};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_dir(Path::new("data/tmdb"), &LoadOptions::default())?;
//! println!("{} movies ready for tagging", catalog.len());
//! ```

// Public modules
pub mod catalog;
pub mod encoded;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use catalog::{CREDITS_FILE, MOVIES_FILE, merge_on_title};
pub use error::{DataIntegrityError, Result};
pub use types::{
    Catalog, LoadOptions, LoadStats, MalformedRowPolicy, MergedRow, MovieId, MovieRecord,
    RawCreditRow, RawMovieRow,
};
