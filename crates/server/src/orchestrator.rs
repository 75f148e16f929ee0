//! # Recommendation Orchestrator
//!
//! This module coordinates one "find similar movies" request:
//! 1. Resolve the title and rank its similarity row (blocking pool)
//! 2. Fetch display metadata for every result concurrently
//! 3. Bound each fetch by a timeout; failures become placeholders
//! 4. Return the results in similarity order
//!
//! A metadata failure never aborts the request or reorders the results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use data_loader::{DataIndex, MovieId};
use metadata_client::{
    tmdb_movie_url, MetadataProvider, MovieDetails, OfflineMetadata, TmdbClient,
    ERROR_POSTER_PLACEHOLDER,
};
use sources::{Candidate, SimilarSource};

use crate::config::Config;

/// Final recommendation returned to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    /// Similarity to the selected movie
    pub score: f64,
    /// `None` when the metadata lookup failed or timed out
    pub details: Option<MovieDetails>,
    pub tmdb_url: String,
}

impl MovieRecommendation {
    /// Poster to display: the real poster, "No Poster", or "Error"
    pub fn poster_or_placeholder(&self) -> &str {
        match &self.details {
            Some(details) => details.poster_or_placeholder(),
            None => ERROR_POSTER_PLACEHOLDER,
        }
    }

    pub fn explanation(&self) -> String {
        format!("Similarity: {:.3}", self.score)
    }
}

/// Details panel for the movie the user picked
#[derive(Debug, Clone, Serialize)]
pub struct SelectedMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub details: Option<MovieDetails>,
    pub tmdb_url: String,
}

/// Load the artifacts named by the config.
///
/// Any failure here is fatal: the caller should exit rather than serve
/// from partial data.
pub fn load_data_index(config: &Config) -> Result<Arc<DataIndex>> {
    let start = Instant::now();
    let data_index = DataIndex::load_from_files(&config.artifact_dir).with_context(|| {
        format!(
            "Failed to load similarity artifacts from {}",
            config.artifact_dir.display()
        )
    })?;
    info!("Loaded {} catalog entries in {:.2?}", data_index.len(), start.elapsed());
    Ok(Arc::new(data_index))
}

/// TMDB client when an API key is configured, otherwise offline metadata
pub fn build_metadata_provider(config: &Config) -> Result<Arc<dyn MetadataProvider>> {
    match config.tmdb_config() {
        Some(tmdb_config) => {
            let client = TmdbClient::new(tmdb_config).context("Failed to create TMDB client")?;
            Ok(Arc::new(client))
        }
        None => {
            warn!("TMDB_API_KEY not set, posters and details are unavailable");
            Ok(Arc::new(OfflineMetadata))
        }
    }
}

/// Main orchestrator that coordinates lookup and metadata enrichment
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    data_index: Arc<DataIndex>,
    similar: SimilarSource,
    metadata: Arc<dyn MetadataProvider>,
    metadata_timeout: Duration,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over a loaded index and a metadata provider
    pub fn new(data_index: Arc<DataIndex>, metadata: Arc<dyn MetadataProvider>) -> Self {
        let similar = SimilarSource::new(data_index.clone());
        Self {
            data_index,
            similar,
            metadata,
            metadata_timeout: metadata_client::tmdb::DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound on each metadata fetch (default: 10s)
    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    /// Load artifacts and build the metadata provider from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let data_index = load_data_index(config)?;
        let metadata = build_metadata_provider(config)?;
        Ok(Self::new(data_index, metadata)
            .with_metadata_timeout(config.metadata_timeout())
            .with_default_limit(config.recommendation_count))
    }

    /// Number of results used when the caller has no preference
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.similar = self.similar.with_default_limit(limit);
        self
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    /// Configured number of results
    pub fn default_limit(&self) -> usize {
        self.similar.default_limit()
    }

    /// Main entry point: movies similar to `title`, best first
    ///
    /// Returns an empty vector if no catalog entry has this exact title.
    #[instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();

        let candidates = self.find_similar(title, limit).await?;
        if candidates.is_empty() {
            info!("No recommendations for {:?}", title);
            return Ok(Vec::new());
        }

        let movie_ids: Vec<MovieId> = candidates.iter().map(|c| c.movie_id).collect();
        let details = self.fetch_details_concurrently(&movie_ids).await;
        let available = details.iter().filter(|d| d.is_some()).count();
        info!(
            "Fetched details for {}/{} recommendations",
            available,
            details.len()
        );

        let recommendations = self.assemble(candidates, details);

        info!(
            "Total time to get recommendations for {:?}: {:.2?}",
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Details panel for the selected movie; `None` if the title is unknown
    pub async fn get_movie_details(&self, title: &str) -> Result<Option<SelectedMovie>> {
        let Some(entry) = self
            .data_index
            .index_of_title(title)
            .and_then(|row| self.data_index.get_entry(row))
        else {
            return Ok(None);
        };

        let details = fetch_with_timeout(self.metadata.as_ref(), entry.id, self.metadata_timeout).await;

        Ok(Some(SelectedMovie {
            movie_id: entry.id,
            title: entry.title.clone(),
            details,
            tmdb_url: tmdb_movie_url(entry.id),
        }))
    }

    /// Run the similarity lookup on the blocking pool
    async fn find_similar(&self, title: &str, limit: usize) -> Result<Vec<Candidate>> {
        let similar = self.similar.clone();
        let title = title.to_string();
        tokio::task::spawn_blocking(move || similar.get_candidates(&title, limit))
            .await
            .context("Similarity lookup task panicked")
    }

    /// Fetch metadata for every id at once, keeping input order
    async fn fetch_details_concurrently(&self, movie_ids: &[MovieId]) -> Vec<Option<MovieDetails>> {
        let handles: Vec<_> = movie_ids
            .iter()
            .map(|&movie_id| {
                let metadata = self.metadata.clone();
                let timeout = self.metadata_timeout;
                tokio::spawn(async move { fetch_with_timeout(metadata.as_ref(), movie_id, timeout).await })
            })
            .collect();

        let mut details = Vec::with_capacity(handles.len());
        for (handle, movie_id) in handles.into_iter().zip(movie_ids) {
            match handle.await {
                Ok(result) => details.push(result),
                Err(e) => {
                    warn!(movie_id = *movie_id, error = %e, "Metadata task failed");
                    details.push(None);
                }
            }
        }
        details
    }

    /// Pair candidates with their details and catalog titles
    fn assemble(
        &self,
        candidates: Vec<Candidate>,
        details: Vec<Option<MovieDetails>>,
    ) -> Vec<MovieRecommendation> {
        candidates
            .into_iter()
            .zip(details)
            .filter_map(|(candidate, details)| {
                let entry = self.data_index.get_entry(candidate.index)?;
                Some(MovieRecommendation {
                    movie_id: entry.id,
                    title: entry.title.clone(),
                    score: candidate.score,
                    details,
                    tmdb_url: tmdb_movie_url(entry.id),
                })
            })
            .collect()
    }
}

/// One metadata lookup, treated as unavailable once `timeout` elapses
async fn fetch_with_timeout(
    metadata: &dyn MetadataProvider,
    movie_id: MovieId,
    timeout: Duration,
) -> Option<MovieDetails> {
    match tokio::time::timeout(timeout, metadata.movie_details(movie_id)).await {
        Ok(details) => details,
        Err(_) => {
            warn!(movie_id, "Metadata lookup timed out after {:?}", timeout);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, CatalogEntry, SimilarityMatrix};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Catalog A..F (ids 1..6) with row A from the documented scenario
    fn build_test_data_index() -> Arc<DataIndex> {
        let entries = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .enumerate()
            .map(|(i, t)| CatalogEntry::new(i as MovieId + 1, *t))
            .collect();
        let catalog = Catalog::from_entries(entries).unwrap();

        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.1, 0.8, 0.2, 0.05],
            vec![0.9, 1.0, 0.3, 0.7, 0.1, 0.0],
            vec![0.1, 0.3, 1.0, 0.2, 0.4, 0.6],
            vec![0.8, 0.7, 0.2, 1.0, 0.3, 0.1],
            vec![0.2, 0.1, 0.4, 0.3, 1.0, 0.5],
            vec![0.05, 0.0, 0.6, 0.1, 0.5, 1.0],
        ])
        .unwrap();

        Arc::new(DataIndex::new(catalog, matrix).unwrap())
    }

    // ============================================================================
    // Mock Metadata Service
    // ============================================================================

    /// Deterministic metadata: ids in `failing` are unavailable, ids in
    /// `hanging` never answer in time
    #[derive(Default)]
    struct MockMetadata {
        failing: HashSet<MovieId>,
        hanging: HashSet<MovieId>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MetadataProvider for MockMetadata {
        async fn movie_details(&self, movie_id: u32) -> Option<MovieDetails> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hanging.contains(&movie_id) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.failing.contains(&movie_id) {
                return None;
            }
            Some(MovieDetails {
                poster_url: Some(format!("https://images.test/{}.jpg", movie_id)),
                overview: format!("Overview {}", movie_id),
                genres: vec!["Drama".to_string()],
                rating: 7.0,
            })
        }
    }

    fn build_test_orchestrator(mock: MockMetadata) -> (RecommendationOrchestrator, Arc<MockMetadata>) {
        let mock = Arc::new(mock);
        let orchestrator = RecommendationOrchestrator::new(build_test_data_index(), mock.clone())
            .with_metadata_timeout(Duration::from_millis(200));
        (orchestrator, mock)
    }

    fn titles(recommendations: &[MovieRecommendation]) -> Vec<&str> {
        recommendations.iter().map(|r| r.title.as_str()).collect()
    }

    // ============================================================================
    // get_recommendations
    // ============================================================================

    #[tokio::test]
    async fn test_recommendations_follow_similarity_order() {
        let (orchestrator, _) = build_test_orchestrator(MockMetadata::default());

        let recommendations = orchestrator
            .get_recommendations("A", 5)
            .await
            .expect("get_recommendations failed");

        assert_eq!(titles(&recommendations), vec!["B", "D", "E", "C", "F"]);
        assert_eq!(recommendations[0].movie_id, 2);
        assert_eq!(recommendations[0].score, 0.9);
        assert_eq!(recommendations[0].tmdb_url, "https://www.themoviedb.org/movie/2");
        assert_eq!(recommendations[0].poster_or_placeholder(), "https://images.test/2.jpg");
        assert!(recommendations[0].explanation().contains("0.900"));
    }

    #[tokio::test]
    async fn test_unknown_title_returns_empty_without_metadata_calls() {
        let (orchestrator, mock) = build_test_orchestrator(MockMetadata::default());

        let recommendations = orchestrator
            .get_recommendations("__unknown__", 5)
            .await
            .expect("unknown title should not be an error");

        assert!(recommendations.is_empty());
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let (orchestrator, mock) = build_test_orchestrator(MockMetadata::default());

        let recommendations = orchestrator.get_recommendations("C", 2).await.unwrap();

        assert_eq!(titles(&recommendations), vec!["F", "E"]);
        assert_eq!(mock.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_metadata_degrades_to_placeholder() {
        let mock = MockMetadata {
            failing: [4].into_iter().collect(),
            ..MockMetadata::default()
        };
        let (orchestrator, _) = build_test_orchestrator(mock);

        let recommendations = orchestrator.get_recommendations("A", 5).await.unwrap();

        assert_eq!(recommendations.len(), 5, "a failed lookup must not drop the item");
        let d = &recommendations[1];
        assert_eq!(d.title, "D");
        assert!(d.details.is_none());
        assert_eq!(d.poster_or_placeholder(), ERROR_POSTER_PLACEHOLDER);
        assert!(recommendations[0].details.is_some());
    }

    #[tokio::test]
    async fn test_hanging_metadata_times_out() {
        let mock = MockMetadata {
            hanging: [2, 6].into_iter().collect(),
            ..MockMetadata::default()
        };
        let (orchestrator, _) = build_test_orchestrator(mock);

        let start = Instant::now();
        let recommendations = orchestrator.get_recommendations("A", 5).await.unwrap();

        // Fetches run concurrently, so two hanging lookups cost one timeout
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(titles(&recommendations), vec!["B", "D", "E", "C", "F"]);
        assert!(recommendations[0].details.is_none());
        assert!(recommendations[4].details.is_none());
        assert!(recommendations[1].details.is_some());
    }

    #[tokio::test]
    async fn test_offline_provider_marks_everything_unavailable() {
        let orchestrator =
            RecommendationOrchestrator::new(build_test_data_index(), Arc::new(OfflineMetadata));

        let recommendations = orchestrator.get_recommendations("B", 5).await.unwrap();

        assert_eq!(recommendations.len(), 5);
        assert!(recommendations.iter().all(|r| r.details.is_none()));
    }

    // ============================================================================
    // get_movie_details
    // ============================================================================

    #[tokio::test]
    async fn test_movie_details_for_selected_title() {
        let (orchestrator, _) = build_test_orchestrator(MockMetadata::default());

        let selected = orchestrator
            .get_movie_details("E")
            .await
            .unwrap()
            .expect("E is in the catalog");

        assert_eq!(selected.movie_id, 5);
        assert_eq!(selected.title, "E");
        assert_eq!(selected.details.unwrap().overview, "Overview 5");
        assert_eq!(selected.tmdb_url, "https://www.themoviedb.org/movie/5");
    }

    #[tokio::test]
    async fn test_movie_details_for_unknown_title() {
        let (orchestrator, _) = build_test_orchestrator(MockMetadata::default());
        assert!(orchestrator.get_movie_details("Z").await.unwrap().is_none());
    }

    // ============================================================================
    // Construction
    // ============================================================================

    #[test]
    fn test_missing_artifacts_are_fatal() {
        let config = Config::from_vars(vec![(
            "ARTIFACT_DIR".to_string(),
            "/definitely/not/here".to_string(),
        )])
        .unwrap();

        let err = RecommendationOrchestrator::from_config(&config).err().expect("load should fail");
        assert!(format!("{:#}", err).contains("Failed to open file"));
    }

    #[test]
    fn test_metadata_provider_without_key_is_offline() {
        let config = Config::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert!(build_metadata_provider(&config).is_ok());
    }
}
