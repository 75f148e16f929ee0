//! Movie metadata client for poster art and details.
//!
//! This crate provides the lookups shown next to each recommendation:
//! - Poster URL (or none)
//! - Overview text
//! - Genre names
//! - Vote average
//!
//! A metadata lookup never fails the caller: [`MetadataProvider::movie_details`]
//! returns `None` ("unavailable") on any network, status or decoding error,
//! and the caller shows placeholder data instead.

use thiserror::Error;
use tracing::debug;

pub mod tmdb;
pub mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::{
    tmdb_movie_url, MovieDetails, ERROR_POSTER_PLACEHOLDER, NO_POSTER_PLACEHOLDER,
};

/// Errors that can occur when talking to the metadata service
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Failed to reach metadata service: {0}")]
    ConnectionError(String),

    #[error("Metadata request timed out")]
    Timeout,

    #[error("Metadata service returned status {0}")]
    Status(u16),

    #[error("Invalid response from metadata service: {0}")]
    InvalidResponse(String),
}

impl MetadataError {
    /// Classify a transport-level reqwest failure
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MetadataError::Timeout
        } else {
            MetadataError::ConnectionError(e.to_string())
        }
    }
}

/// Source of display metadata for catalog movies.
///
/// Implementations swallow their own failures; `None` means "unavailable".
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Details for the movie with this TMDB id, or `None` if unavailable
    async fn movie_details(&self, movie_id: u32) -> Option<MovieDetails>;
}

/// Provider used when no API key is configured: everything is unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineMetadata;

#[async_trait::async_trait]
impl MetadataProvider for OfflineMetadata {
    async fn movie_details(&self, movie_id: u32) -> Option<MovieDetails> {
        debug!("Offline mode, no details for movie {}", movie_id);
        None
    }
}
