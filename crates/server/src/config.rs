use metadata_client::TmdbConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding movie_list.json and similarity.json
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// TMDB API key; without one, details and posters are unavailable
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are resolved against
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Per-request timeout for metadata lookups
    #[serde(default = "default_tmdb_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    /// Number of similar titles to return
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_tmdb_api_url() -> String {
    metadata_client::tmdb::DEFAULT_API_URL.to_string()
}

fn default_tmdb_image_url() -> String {
    metadata_client::tmdb::DEFAULT_IMAGE_BASE_URL.to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    10
}

fn default_recommendation_count() -> usize {
    sources::DEFAULT_LIMIT
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.tmdb_timeout_secs)
    }

    /// TMDB settings, or `None` when no (non-blank) API key is set
    pub fn tmdb_config(&self) -> Option<TmdbConfig> {
        let api_key = self.tmdb_api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(
            TmdbConfig::new(api_key)
                .with_api_url(self.tmdb_api_url.clone())
                .with_image_base_url(self.tmdb_image_url.clone())
                .with_timeout(self.metadata_timeout()),
        )
    }
}
