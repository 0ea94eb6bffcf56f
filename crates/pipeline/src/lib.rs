//! Feature engineering and similarity computation for movie records.
//!
//! This crate provides:
//! - Tag building (one lowercase text per movie)
//! - TokenNormalizer trait with Porter2 stemming and identity implementations
//! - CountVectorizer for a bounded, stop-word-free vocabulary
//! - SimilarityMatrix for all-pairs cosine similarity
//! - FeaturePipeline for running the stages as one batch build
//!
//! ## Architecture
//! The pipeline processes a catalog once:
//! 1. Records are flattened into tag texts and stemmed
//! 2. The vectorizer fits a vocabulary and encodes count vectors
//! 3. The similarity engine compares every pair of movies
//!
//! Everything produced is immutable and row-aligned with the input records.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FeaturePipeline;
//!
//! let model = FeaturePipeline::new().run(catalog.records())?;
//! let neighbours = model.similarity.row(0);
//! ```

pub mod feature_pipeline;
pub mod similarity;
pub mod stemmer;
pub mod stopwords;
pub mod tags;
pub mod traits;
pub mod vectorizer;

// Re-export main types
pub use feature_pipeline::{FeatureModel, FeaturePipeline};
pub use similarity::SimilarityMatrix;
pub use stemmer::{IdentityNormalizer, PorterStemmer};
pub use tags::{TaggedMovie, build_tag_text, tag_movie};
pub use traits::TokenNormalizer;
pub use vectorizer::{CountVectorizer, DEFAULT_MAX_VOCAB, FeatureMatrix, SparseRow, VocabularyIndex};
