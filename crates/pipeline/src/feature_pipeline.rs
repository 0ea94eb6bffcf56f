//! The FeaturePipeline runs the batch build from records to similarities.
//!
//! Stages, in order:
//! 1. Tag every record and normalize its tokens
//! 2. Fit the vocabulary and encode count vectors
//! 3. Compute the similarity matrix

use crate::similarity::SimilarityMatrix;
use crate::stemmer::PorterStemmer;
use crate::tags::{TaggedMovie, tag_movie};
use crate::traits::TokenNormalizer;
use crate::vectorizer::{CountVectorizer, FeatureMatrix, VocabularyIndex};
use anyhow::{Result, ensure};
use data_loader::MovieRecord;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Everything the batch build produces, row-aligned with the input records.
#[derive(Debug, Clone)]
pub struct FeatureModel {
    pub movies: Vec<TaggedMovie>,
    pub vocabulary: VocabularyIndex,
    pub features: FeatureMatrix,
    pub similarity: SimilarityMatrix,
}

/// Configurable record -> similarity pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FeaturePipeline::new()
///     .with_vectorizer(CountVectorizer::new().with_max_vocab(5000));
///
/// let model = pipeline.run(catalog.records())?;
/// ```
pub struct FeaturePipeline {
    normalizer: Box<dyn TokenNormalizer>,
    vectorizer: CountVectorizer,
}

impl FeaturePipeline {
    /// Porter2 stemming and the default vectorizer
    pub fn new() -> Self {
        Self {
            normalizer: Box::new(PorterStemmer::new()),
            vectorizer: CountVectorizer::new(),
        }
    }

    /// Replace the token normalizer (builder pattern).
    pub fn with_normalizer(mut self, normalizer: impl TokenNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Replace the vectorizer (builder pattern).
    pub fn with_vectorizer(mut self, vectorizer: CountVectorizer) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    /// Stage 1: tag and normalize every record, preserving order
    pub fn tag(&self, records: &[MovieRecord]) -> Vec<TaggedMovie> {
        let normalizer = self.normalizer.as_ref();
        records
            .par_iter()
            .map(|record| tag_movie(record, normalizer))
            .collect()
    }

    /// Run all stages over `records`.
    ///
    /// # Returns
    /// * `Ok(FeatureModel)` - row i of every matrix belongs to `records[i]`
    /// * `Err` - if there are no records to build from
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn run(&self, records: &[MovieRecord]) -> Result<FeatureModel> {
        ensure!(!records.is_empty(), "Cannot build features for an empty catalog");
        let start = Instant::now();

        debug!("Tagging {} records with {}", records.len(), self.normalizer.name());
        let movies = self.tag(records);

        let documents: Vec<&str> = movies.iter().map(|m| m.tag_text.as_str()).collect();
        let (vocabulary, features) = self.vectorizer.fit_transform(&documents);
        debug!(
            "Vocabulary fitted: {} terms (cap {})",
            vocabulary.len(),
            self.vectorizer.max_vocab()
        );

        let similarity = SimilarityMatrix::from_features(&features);
        debug!("Similarity matrix built: {}x{}", similarity.len(), similarity.len());

        info!(
            "Feature build complete: {} movies, {} terms in {:.2?}",
            movies.len(),
            vocabulary.len(),
            start.elapsed()
        );

        Ok(FeatureModel {
            movies,
            vocabulary,
            features,
            similarity,
        })
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stemmer::IdentityNormalizer;

    fn record(id: u32, title: &str, overview: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            genres: vec![],
            keywords: vec![],
            cast: vec![],
            director: vec![],
            overview_tokens: overview.split_whitespace().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(FeaturePipeline::new().run(&[]).is_err());
    }

    #[test]
    fn test_rows_align_with_records() {
        let records = vec![
            record(10, "First", "cats chasing mice"),
            record(20, "Second", "dogs chasing cats"),
        ];
        let model = FeaturePipeline::new().run(&records).unwrap();

        assert_eq!(model.movies[0].id, 10);
        assert_eq!(model.movies[1].title, "Second");
        assert_eq!(model.features.n_rows(), 2);
        assert_eq!(model.similarity.len(), 2);
        // "cat" and "chase" are shared after stemming
        assert!(model.vocabulary.get("cat").is_some());
    }

    #[test]
    fn test_normalizer_is_pluggable() {
        let records = vec![record(1, "Only", "cats running")];
        let model = FeaturePipeline::new()
            .with_normalizer(IdentityNormalizer)
            .run(&records)
            .unwrap();
        assert_eq!(model.movies[0].tag_text, "cats running");
        assert!(model.vocabulary.get("cats").is_some());
    }

    #[test]
    fn test_vectorizer_is_configurable() {
        let records = vec![record(1, "Only", "alpha beta gamma delta")];
        let model = FeaturePipeline::new()
            .with_normalizer(IdentityNormalizer)
            .with_vectorizer(CountVectorizer::new().with_max_vocab(2))
            .run(&records)
            .unwrap();
        assert_eq!(model.vocabulary.len(), 2);
    }
}
