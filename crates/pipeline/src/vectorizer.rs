//! Count vectorization of tag texts.
//!
//! ## Algorithm
//! 1. Analyze each document: lowercase, extract tokens of two or more word
//!    characters, drop stop words
//! 2. Count every token across the whole corpus
//! 3. Keep the `max_vocab` most frequent tokens (ties broken lexically)
//! 4. Assign columns to the kept tokens in lexical order
//! 5. Encode each document as a sparse row of raw counts
//!
//! Every step is order-independent or explicitly sorted, so the same corpus
//! always yields the same vocabulary and the same matrix.

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use crate::stopwords;

/// Default vocabulary cap
pub const DEFAULT_MAX_VOCAB: usize = 5000;

/// Tokens are runs of at least two word characters; punctuation separates them
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

static DEFAULT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern is valid"));

// =============================================================================
// VocabularyIndex
// =============================================================================

/// Token -> column mapping, fixed once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyIndex {
    /// Terms in column order
    terms: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl VocabularyIndex {
    /// Build from terms already in column order.
    pub fn from_terms(terms: Vec<String>) -> Self {
        let lookup = terms
            .iter()
            .enumerate()
            .map(|(column, term)| (term.clone(), column))
            .collect();
        Self { terms, lookup }
    }

    /// Column of `term`, if it is in the vocabulary
    pub fn get(&self, term: &str) -> Option<usize> {
        self.lookup.get(term).copied()
    }

    /// Term stored at `column`
    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get(column).map(String::as_str)
    }

    /// All terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

// =============================================================================
// FeatureMatrix
// =============================================================================

/// One row of the feature matrix: sorted column indices and their counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseRow {
    indices: Vec<usize>,
    counts: Vec<u32>,
}

impl SparseRow {
    /// Build from `(column, count)` pairs in ascending column order.
    fn from_sorted(entries: BTreeMap<usize, u32>) -> Self {
        let (indices, counts) = entries.into_iter().unzip();
        Self { indices, counts }
    }

    /// Count stored at `column` (0 if absent)
    pub fn get(&self, column: usize) -> u32 {
        match self.indices.binary_search(&column) {
            Ok(pos) => self.counts[pos],
            Err(_) => 0,
        }
    }

    /// Non-zero `(column, count)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.indices.iter().copied().zip(self.counts.iter().copied())
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Euclidean length of the row
    pub fn norm(&self) -> f64 {
        self.counts
            .iter()
            .map(|&c| (c as f64) * (c as f64))
            .sum::<f64>()
            .sqrt()
    }
}

/// N x V matrix of raw token counts, one row per movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_cols: usize,
    rows: Vec<SparseRow>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, index: usize) -> Option<&SparseRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// Entry `(row, column)`; 0 outside the stored entries
    pub fn get(&self, row: usize, column: usize) -> u32 {
        self.rows.get(row).map(|r| r.get(column)).unwrap_or(0)
    }

    /// Materialize one row as a dense vector of length `n_cols`
    pub fn dense_row(&self, index: usize) -> Option<Vec<u32>> {
        let row = self.rows.get(index)?;
        let mut dense = vec![0; self.n_cols];
        for (column, count) in row.iter() {
            dense[column] = count;
        }
        Some(dense)
    }
}

// =============================================================================
// CountVectorizer
// =============================================================================

/// Builds a bounded vocabulary and count vectors over a corpus.
///
/// ## Usage
/// ```ignore
/// let vectorizer = CountVectorizer::new().with_max_vocab(5000);
/// let (vocabulary, features) = vectorizer.fit_transform(&tag_texts);
/// ```
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    max_vocab: usize,
    stop_words: HashSet<String>,
    token_pattern: Regex,
}

impl CountVectorizer {
    /// English stop words, default token pattern, 5000-term cap
    pub fn new() -> Self {
        Self {
            max_vocab: DEFAULT_MAX_VOCAB,
            stop_words: stopwords::english(),
            token_pattern: DEFAULT_TOKEN_REGEX.clone(),
        }
    }

    /// Configure the vocabulary cap (default: 5000)
    pub fn with_max_vocab(mut self, max_vocab: usize) -> Self {
        self.max_vocab = max_vocab;
        self
    }

    /// Replace the stop-word list
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    /// Replace the token pattern
    pub fn with_token_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.token_pattern = Regex::new(pattern)?;
        Ok(self)
    }

    pub fn max_vocab(&self) -> usize {
        self.max_vocab
    }

    /// Tokens of `text` that are eligible as features, in order.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }

    /// Select the vocabulary from the corpus.
    pub fn fit<S: AsRef<str> + Sync>(&self, documents: &[S]) -> VocabularyIndex {
        let totals: HashMap<String, u64> = documents
            .par_iter()
            .map(|doc| {
                let mut counts: HashMap<String, u64> = HashMap::new();
                for token in self.analyze(doc.as_ref()) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .reduce(HashMap::new, |mut acc, counts| {
                for (token, count) in counts {
                    *acc.entry(token).or_insert(0) += count;
                }
                acc
            });

        let mut ranked: Vec<(String, u64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_vocab);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();
        VocabularyIndex::from_terms(terms)
    }

    /// Encode every document against a fixed vocabulary.
    ///
    /// Tokens outside the vocabulary are ignored.
    pub fn transform<S: AsRef<str> + Sync>(
        &self,
        vocabulary: &VocabularyIndex,
        documents: &[S],
    ) -> FeatureMatrix {
        let rows = documents
            .par_iter()
            .map(|doc| {
                let mut entries: BTreeMap<usize, u32> = BTreeMap::new();
                for token in self.analyze(doc.as_ref()) {
                    if let Some(column) = vocabulary.get(&token) {
                        *entries.entry(column).or_insert(0) += 1;
                    }
                }
                SparseRow::from_sorted(entries)
            })
            .collect();

        FeatureMatrix {
            n_cols: vocabulary.len(),
            rows,
        }
    }

    /// `fit` followed by `transform` on the same corpus
    pub fn fit_transform<S: AsRef<str> + Sync>(
        &self,
        documents: &[S],
    ) -> (VocabularyIndex, FeatureMatrix) {
        let vocabulary = self.fit(documents);
        let features = self.transform(&vocabulary, documents);
        (vocabulary, features)
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_drops_punctuation_short_tokens_and_stop_words() {
        let vectorizer = CountVectorizer::new();
        assert_eq!(
            vectorizer.analyze("The hero, a Marine, fights x-men in 2154."),
            vec!["hero", "marine", "fights", "men", "2154"]
        );
    }

    #[test]
    fn test_vocabulary_in_lexical_order() {
        let docs = ["zebra apple mango", "apple zebra"];
        let vocabulary = CountVectorizer::new().fit(&docs);
        assert_eq!(vocabulary.terms(), &["apple", "mango", "zebra"]);
        assert_eq!(vocabulary.get("mango"), Some(1));
        assert_eq!(vocabulary.term(2), Some("zebra"));
        assert_eq!(vocabulary.get("kiwi"), None);
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent() {
        let docs = ["alpha alpha alpha beta beta gamma", "delta alpha"];
        let vocabulary = CountVectorizer::new().with_max_vocab(2).fit(&docs);
        assert_eq!(vocabulary.terms(), &["alpha", "beta"]);
    }

    #[test]
    fn test_vocabulary_ties_broken_lexically() {
        let docs = ["delta charlie bravo alpha"];
        let vocabulary = CountVectorizer::new().with_max_vocab(2).fit(&docs);
        assert_eq!(vocabulary.terms(), &["alpha", "bravo"]);
    }

    #[test]
    fn test_stop_words_never_enter_vocabulary() {
        let docs = ["the the the the movie"];
        let vocabulary = CountVectorizer::new().fit(&docs);
        assert_eq!(vocabulary.terms(), &["movie"]);
    }

    #[test]
    fn test_custom_stop_words() {
        let docs = ["the movie"];
        let vocabulary = CountVectorizer::new()
            .with_stop_words(["MOVIE"])
            .fit(&docs);
        assert_eq!(vocabulary.terms(), &["the"]);
    }

    #[test]
    fn test_transform_counts() {
        let docs = ["space war space", "love story", "unknown"];
        let vectorizer = CountVectorizer::new();
        let vocabulary = vectorizer.fit(&docs[..2]);
        let features = vectorizer.transform(&vocabulary, &docs);

        assert_eq!(features.n_rows(), 3);
        assert_eq!(features.n_cols(), 4);
        let space = vocabulary.get("space").unwrap();
        assert_eq!(features.get(0, space), 2);
        assert_eq!(features.get(1, space), 0);
        assert!(features.row(2).unwrap().is_zero());
        assert_eq!(features.dense_row(0).unwrap().iter().sum::<u32>(), 3);
    }

    #[test]
    fn test_fit_transform_is_deterministic() {
        let docs: Vec<String> = (0..50)
            .map(|i| format!("token{} shared common{} word{}", i % 7, i % 3, i))
            .collect();
        let vectorizer = CountVectorizer::new().with_max_vocab(10);

        let first = vectorizer.fit_transform(&docs);
        let second = vectorizer.fit_transform(&docs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_token_pattern() {
        assert!(CountVectorizer::new().with_token_pattern("(").is_err());
    }
}
