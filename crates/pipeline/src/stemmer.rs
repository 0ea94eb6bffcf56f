//! Token normalizers: Porter2 stemming and the identity mapping.

use crate::traits::TokenNormalizer;
use rust_stemmers::{Algorithm, Stemmer};

/// Snowball English (Porter2) stemmer.
///
/// The algorithm tables are compiled into the binary, so building a model
/// never needs to fetch language resources at runtime.
pub struct PorterStemmer {
    stemmer: Stemmer,
}

impl PorterStemmer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for PorterStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenNormalizer for PorterStemmer {
    fn name(&self) -> &str {
        "PorterStemmer"
    }

    fn normalize_token(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }
}

/// Leaves tokens untouched; only whitespace is canonicalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl TokenNormalizer for IdentityNormalizer {
    fn name(&self) -> &str {
        "IdentityNormalizer"
    }

    fn normalize_token(&self, token: &str) -> String {
        token.to_string()
    }
}
