//! # Recommendation Service
//!
//! Owns the build-once model and answers recommendation requests:
//! 1. Build the `CatalogModel` on first use (one build, however many callers)
//! 2. Resolve the title and rank neighbours (pure read)
//! 3. Optionally look up posters for the results, concurrently and best-effort

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::{info, warn};

use data_loader::{MovieId, MovieRecord};

use crate::config::ModelConfig;
use crate::model::CatalogModel;
use crate::poster::PosterClient;

/// Where the catalog comes from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// A directory holding the default TMDB file names
    Directory(PathBuf),
    /// Explicit table paths
    Files { movies: PathBuf, credits: PathBuf },
    /// Records already in memory
    Records(Arc<Vec<MovieRecord>>),
}

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f64,
    pub poster_url: Option<String>,
}

/// Build-once model holder plus optional poster enrichment.
///
/// Clones share the same model cell, so a model built through one clone is
/// visible to all of them.
#[derive(Clone)]
pub struct RecommendationService {
    source: CatalogSource,
    config: ModelConfig,
    model: Arc<OnceCell<Arc<CatalogModel>>>,
    posters: Option<PosterClient>,
}

impl RecommendationService {
    pub fn new(source: CatalogSource, config: ModelConfig) -> Self {
        Self {
            source,
            config,
            model: Arc::new(OnceCell::new()),
            posters: None,
        }
    }

    /// Enable poster lookups for every recommendation
    pub fn with_posters(mut self, client: PosterClient) -> Self {
        self.posters = Some(client);
        self
    }

    /// The frozen model, building it first if nobody has yet.
    ///
    /// Concurrent first callers all wait on the same build. A failed build
    /// leaves the cell empty.
    pub async fn model(&self) -> Result<Arc<CatalogModel>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let source = self.source.clone();
                let config = self.config;
                let start = Instant::now();

                // The build is CPU-bound; keep it off the async workers
                let model = tokio::task::spawn_blocking(move || build_model(&source, &config))
                    .await
                    .context("Model build task panicked")??;

                info!("Model ready: {} movies in {:.2?}", model.len(), start.elapsed());
                Ok::<_, anyhow::Error>(Arc::new(model))
            })
            .await?;
        Ok(Arc::clone(model))
    }

    /// Main entry point: recommendations for a title
    ///
    /// # Returns
    /// Up to `k` recommendations, most similar first. Fails with a
    /// `QueryError` (inside the `anyhow::Error`) for an unknown or ambiguous
    /// title.
    pub async fn get_recommendations(&self, title: &str, k: usize) -> Result<Vec<MovieRecommendation>> {
        let model = self.model().await?;
        let start = Instant::now();

        let ranked = model.recommend(title, k)?;
        let mut recommendations: Vec<MovieRecommendation> = ranked
            .into_iter()
            .map(|r| MovieRecommendation {
                movie_id: r.movie_id,
                title: r.title,
                score: r.score,
                poster_url: None,
            })
            .collect();

        if let Some(client) = &self.posters {
            attach_posters(client, &mut recommendations).await;
        }

        info!(
            "Recommended {} movies for '{}' in {:.2?}",
            recommendations.len(),
            title,
            start.elapsed()
        );
        Ok(recommendations)
    }
}

fn build_model(source: &CatalogSource, config: &ModelConfig) -> Result<CatalogModel> {
    match source {
        CatalogSource::Directory(dir) => CatalogModel::load(dir, config),
        CatalogSource::Files { movies, credits } => CatalogModel::load_files(movies, credits, config),
        CatalogSource::Records(records) => CatalogModel::build(records, config),
    }
}

/// Fetch all posters concurrently; a failed lookup only loses its image.
async fn attach_posters(client: &PosterClient, recommendations: &mut [MovieRecommendation]) {
    let mut lookups = JoinSet::new();
    for (index, rec) in recommendations.iter().enumerate() {
        let client = client.clone();
        let movie_id = rec.movie_id;
        lookups.spawn(async move { (index, client.fetch_poster(movie_id).await) });
    }

    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((index, poster)) => recommendations[index].poster_url = poster,
            Err(err) => warn!("Poster lookup task failed: {}", err),
        }
    }
}
