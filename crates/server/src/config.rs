//! Model configuration.
//!
//! Every knob of the batch build and of title resolution lives here, set
//! through builder methods and handed to `CatalogModel::build`.

use data_loader::{LoadOptions, MalformedRowPolicy};
use pipeline::{CountVectorizer, FeaturePipeline, IdentityNormalizer, PorterStemmer};
use serde::{Deserialize, Serialize};

/// How a query title that matches several catalog rows is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicateTitlePolicy {
    /// Use the first matching row in catalog order
    #[default]
    FirstMatch,
    /// Refuse to guess and report the title as ambiguous
    Reject,
}

/// Settings for building and querying a `CatalogModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Vocabulary cap for the vectorizer
    pub max_vocab: usize,
    /// Top-billed cast members kept per movie
    pub cast_limit: usize,
    /// Stem tag tokens (Porter2) or keep them as-is
    pub stemming: bool,
    pub duplicate_titles: DuplicateTitlePolicy,
    pub malformed_rows: MalformedRowPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_vocab: pipeline::DEFAULT_MAX_VOCAB,
            cast_limit: 3,
            stemming: true,
            duplicate_titles: DuplicateTitlePolicy::FirstMatch,
            malformed_rows: MalformedRowPolicy::Fail,
        }
    }
}

impl ModelConfig {
    /// Configure the vocabulary cap (default: 5000)
    pub fn with_max_vocab(mut self, max_vocab: usize) -> Self {
        self.max_vocab = max_vocab;
        self
    }

    /// Configure how many cast members are kept (default: 3)
    pub fn with_cast_limit(mut self, cast_limit: usize) -> Self {
        self.cast_limit = cast_limit;
        self
    }

    /// Enable or disable stemming (default: enabled)
    pub fn with_stemming(mut self, stemming: bool) -> Self {
        self.stemming = stemming;
        self
    }

    /// Configure duplicate-title resolution (default: first match)
    pub fn with_duplicate_titles(mut self, policy: DuplicateTitlePolicy) -> Self {
        self.duplicate_titles = policy;
        self
    }

    /// Configure malformed-row handling (default: fail the build)
    pub fn with_malformed_rows(mut self, policy: MalformedRowPolicy) -> Self {
        self.malformed_rows = policy;
        self
    }

    /// Options for the data loader
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            cast_limit: self.cast_limit,
            malformed_rows: self.malformed_rows,
        }
    }

    /// The feature pipeline these settings describe
    pub fn feature_pipeline(&self) -> FeaturePipeline {
        let pipeline = FeaturePipeline::new()
            .with_vectorizer(CountVectorizer::new().with_max_vocab(self.max_vocab));
        if self.stemming {
            pipeline.with_normalizer(PorterStemmer::new())
        } else {
            pipeline.with_normalizer(IdentityNormalizer)
        }
    }
}
