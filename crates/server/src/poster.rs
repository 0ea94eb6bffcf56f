//! Best-effort poster lookup against the TMDB API.
//!
//! A poster is decoration: every failure (network, timeout, bad status,
//! unexpected body, no poster on file) is logged and turned into `None`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use data_loader::MovieId;

use crate::error::EnrichmentFailure;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The part of `GET /movie/{id}` we read
#[derive(Debug, Deserialize)]
struct MovieDetails {
    poster_path: Option<String>,
}

/// Client for poster URLs. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PosterClient {
    http: Client,
    api_key: String,
    api_base: String,
    image_base: String,
}

impl PosterClient {
    /// Create a client with the given API key and request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base: TMDB_API_BASE.to_string(),
            image_base: TMDB_IMAGE_BASE.to_string(),
        })
    }

    /// Point the client at another API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Poster URL for `movie_id`, or `None` if it cannot be determined.
    pub async fn fetch_poster(&self, movie_id: MovieId) -> Option<String> {
        match self.try_fetch(movie_id).await {
            Ok(url) => url,
            Err(err) => {
                warn!("No poster for movie {}: {}", movie_id, err);
                None
            }
        }
    }

    async fn try_fetch(&self, movie_id: MovieId) -> Result<Option<String>, EnrichmentFailure> {
        let url = format!("{}/movie/{}", self.api_base.trim_end_matches('/'), movie_id);
        debug!("Fetching poster details from {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentFailure::Status(status.as_u16()));
        }

        let body = response.text().await?;
        poster_url_from_details(&body, &self.image_base)
    }
}

/// Build the full image URL from a movie-details JSON body.
pub fn poster_url_from_details(
    body: &str,
    image_base: &str,
) -> Result<Option<String>, EnrichmentFailure> {
    let details: MovieDetails = serde_json::from_str(body)?;
    Ok(details
        .poster_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", image_base, path)))
}
