//! # Catalog Model
//!
//! The frozen result of the batch build plus the read-only queries served
//! from it. A `CatalogModel` is built once, wrapped in an `Arc`, and passed
//! by reference to every handler; nothing in it changes after `build`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument};

use data_loader::{Catalog, MovieId, MovieRecord};
use pipeline::{FeatureMatrix, SimilarityMatrix, TaggedMovie, VocabularyIndex};

use crate::config::{DuplicateTitlePolicy, ModelConfig};
use crate::error::QueryError;

/// Number of recommendations returned when the caller does not choose
pub const DEFAULT_K: usize = 5;

/// One ranked neighbour of the queried movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f64,
}

/// Immutable catalog, features and similarities, row-aligned.
#[derive(Debug)]
pub struct CatalogModel {
    movies: Vec<TaggedMovie>,
    vocabulary: VocabularyIndex,
    features: FeatureMatrix,
    similarity: SimilarityMatrix,
    /// Lowercased title -> rows, in catalog order
    title_index: HashMap<String, Vec<usize>>,
    duplicate_titles: DuplicateTitlePolicy,
}

impl CatalogModel {
    /// Load the tables from `data_dir` and build the model
    pub fn load(data_dir: &Path, config: &ModelConfig) -> Result<Self> {
        let catalog = Catalog::load_from_dir(data_dir, &config.load_options())
            .context("Failed to load movie catalog")?;
        Self::build(catalog.records(), config)
    }

    /// Load the tables from explicit paths and build the model
    pub fn load_files(movies: &Path, credits: &Path, config: &ModelConfig) -> Result<Self> {
        let catalog = Catalog::load_from_files(movies, credits, &config.load_options())
            .context("Failed to load movie catalog")?;
        Self::build(catalog.records(), config)
    }

    /// Run the feature pipeline over `records` and freeze the result
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build(records: &[MovieRecord], config: &ModelConfig) -> Result<Self> {
        let model = config
            .feature_pipeline()
            .run(records)
            .context("Failed to build feature model")?;

        let mut title_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (row, movie) in model.movies.iter().enumerate() {
            title_index
                .entry(movie.title.to_lowercase())
                .or_default()
                .push(row);
        }

        let duplicates = title_index.values().filter(|rows| rows.len() > 1).count();
        if duplicates > 0 {
            info!(
                "{} titles appear more than once; resolving with {:?}",
                duplicates, config.duplicate_titles
            );
        }

        Ok(Self {
            movies: model.movies,
            vocabulary: model.vocabulary,
            features: model.features,
            similarity: model.similarity,
            title_index,
            duplicate_titles: config.duplicate_titles,
        })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// All movies in catalog order
    pub fn movies(&self) -> &[TaggedMovie] {
        &self.movies
    }

    pub fn movie(&self, row: usize) -> Option<&TaggedMovie> {
        self.movies.get(row)
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Resolve a title to its catalog row, ignoring case.
    pub fn find_row(&self, title: &str) -> Result<usize, QueryError> {
        let rows = self
            .title_index
            .get(&title.to_lowercase())
            .ok_or_else(|| QueryError::NotFound {
                title: title.to_string(),
            })?;

        match (self.duplicate_titles, rows.as_slice()) {
            (_, [row]) => Ok(*row),
            (DuplicateTitlePolicy::FirstMatch, [first, ..]) => Ok(*first),
            (DuplicateTitlePolicy::Reject, rows) if rows.len() > 1 => {
                Err(QueryError::AmbiguousTitle {
                    title: title.to_string(),
                    matches: rows.len(),
                })
            }
            _ => Err(QueryError::NotFound {
                title: title.to_string(),
            }),
        }
    }

    /// The `k` movies most similar to `title`, best first.
    ///
    /// The queried movie itself is never returned. Equal scores keep catalog
    /// order. Asking for more than the catalog holds returns everything else.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation>, QueryError> {
        let row = self.find_row(title)?;
        let scores = self.similarity.row(row).ok_or_else(|| QueryError::NotFound {
            title: title.to_string(),
        })?;

        let recommendations: Vec<Recommendation> = rank_neighbours(scores, row, k)
            .into_iter()
            .map(|(index, score)| {
                let movie = &self.movies[index];
                Recommendation {
                    movie_id: movie.id,
                    title: movie.title.clone(),
                    score,
                }
            })
            .collect();

        debug!("Resolved '{}' to row {}, {} neighbours", title, row, recommendations.len());
        Ok(recommendations)
    }

    /// Titles matching `fragment`, ignoring case: exact matches first, then
    /// substring matches, each group in catalog order.
    pub fn search(&self, fragment: &str, limit: usize) -> Vec<&TaggedMovie> {
        let needle = fragment.to_lowercase();
        let mut matches: Vec<(u8, &TaggedMovie)> = self
            .movies
            .iter()
            .filter_map(|movie| {
                let title = movie.title.to_lowercase();
                if title == needle {
                    Some((0, movie))
                } else if title.contains(&needle) {
                    Some((1, movie))
                } else {
                    None
                }
            })
            .collect();
        matches.sort_by_key(|(rank, _)| *rank);
        matches.into_iter().take(limit).map(|(_, movie)| movie).collect()
    }

    /// The `n` most frequent vocabulary terms of a movie, highest count first
    pub fn top_terms(&self, row: usize, n: usize) -> Vec<(&str, u32)> {
        let Some(features) = self.features.row(row) else {
            return Vec::new();
        };
        let mut terms: Vec<(&str, u32)> = features
            .iter()
            .filter_map(|(column, count)| Some((self.vocabulary.term(column)?, count)))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(n);
        terms
    }
}

/// Rank every row except `exclude` by descending score.
///
/// `sort_by` is stable, so ties stay in catalog order.
fn rank_neighbours(scores: &[f64], exclude: usize, k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(index, _)| *index != exclude)
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(k);
    ranked
}
