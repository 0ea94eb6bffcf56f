//! Server crate for the content-based recommender.
//!
//! This crate turns a loaded catalog into a queryable model and serves
//! recommendations from it.
//!
//! - **config**: `ModelConfig` and the duplicate-title policy
//! - **model**: `CatalogModel`, the frozen build plus title queries
//! - **poster**: best-effort poster URL lookups
//! - **service**: `RecommendationService`, build-once caching and enrichment
//! - **error**: `QueryError` and `EnrichmentFailure`

pub mod config;
pub mod error;
pub mod model;
pub mod poster;
pub mod service;

pub use config::{DuplicateTitlePolicy, ModelConfig};
pub use error::{EnrichmentFailure, QueryError};
pub use model::{CatalogModel, DEFAULT_K, Recommendation};
pub use poster::PosterClient;
pub use service::{CatalogSource, MovieRecommendation, RecommendationService};
