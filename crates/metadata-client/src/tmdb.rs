//! TMDB movie details client.
//!
//! Calls `GET {api_url}/movie/{id}?api_key=..&language=..` with a bounded
//! timeout and memoizes successful lookups for the life of the client.

use crate::types::{MovieDetails, TmdbMovie};
use crate::{MetadataError, MetadataProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the TMDB API
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_url: String,
    pub image_base_url: String,
    pub language: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    /// Settings for the public TMDB API with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            language: "en-US".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for TMDB movie details.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct TmdbClient {
    http_client: reqwest::Client,
    config: TmdbConfig,
    cache: Arc<RwLock<HashMap<u32, MovieDetails>>>,
}

impl TmdbClient {
    /// Build a client whose every request is bounded by `config.timeout`
    pub fn new(config: TmdbConfig) -> Result<Self, MetadataError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MetadataError::ClientBuild(e.to_string()))?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Build a client around an existing `reqwest::Client`.
    ///
    /// The caller's client settings apply as-is; `config.timeout` is not
    /// added to it.
    pub fn with_http_client(config: TmdbConfig, http_client: reqwest::Client) -> Self {
        info!("TMDB client targeting {}", config.api_url);
        Self {
            http_client,
            config,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch details for one movie, bypassing the cache.
    ///
    /// Unlike [`MetadataProvider::movie_details`], failures are returned.
    pub async fn fetch_details(&self, movie_id: u32) -> Result<MovieDetails, MetadataError> {
        let url = format!(
            "{}/movie/{}",
            self.config.api_url.trim_end_matches('/'),
            movie_id
        );
        debug!("Fetching TMDB details for movie {}", movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .send()
            .await
            .map_err(MetadataError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let movie: TmdbMovie = response.json().await.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Timeout
            } else {
                MetadataError::InvalidResponse(e.to_string())
            }
        })?;

        Ok(MovieDetails::from_tmdb(movie, &self.config.image_base_url))
    }

    /// Number of memoized lookups
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    async fn movie_details(&self, movie_id: u32) -> Option<MovieDetails> {
        if let Some(details) = self.cache.read().await.get(&movie_id) {
            return Some(details.clone());
        }

        match self.fetch_details(movie_id).await {
            Ok(details) => {
                self.cache.write().await.insert(movie_id, details.clone());
                Some(details)
            }
            Err(e) => {
                warn!(movie_id, error = %e, "TMDB details unavailable");
                None
            }
        }
    }
}
