//! Similar-titles lookup over the precomputed similarity matrix.
//!
//! ## Algorithm
//! 1. Resolve the title to a catalog row (first row with that exact title)
//! 2. Read that row of the similarity matrix
//! 3. Rank every other column by score, ties by index ascending
//! 4. Keep the top `k` and map them back to catalog entries
//!
//! The queried row itself is excluded by index, so a neighbor scoring the
//! same as the self-similarity is never lost.

use crate::ranking::rank_row;
use crate::types::Candidate;
use data_loader::{CatalogEntry, DataIndex, MovieId};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Number of recommendations when the caller doesn't ask for a specific count
pub const DEFAULT_LIMIT: usize = 5;

/// Entries most similar to `title`, best first.
///
/// Returns an empty vector when no entry has this exact title.
pub fn recommend<'a>(index: &'a DataIndex, title: &str, k: usize) -> Vec<&'a CatalogEntry> {
    recommend_scored(index, title, k)
        .into_iter()
        .filter_map(|candidate| index.get_entry(candidate.index))
        .collect()
}

/// Like [`recommend`], keeping each neighbor's row and score
pub fn recommend_scored(index: &DataIndex, title: &str, k: usize) -> Vec<Candidate> {
    match index.index_of_title(title) {
        Some(row) => recommend_by_index(index, row, k),
        None => {
            debug!("Title {:?} not found in catalog", title);
            Vec::new()
        }
    }
}

/// Neighbors of the entry with this movie id
pub fn recommend_by_id(index: &DataIndex, movie_id: MovieId, k: usize) -> Vec<Candidate> {
    match index.index_of_id(movie_id) {
        Some(row) => recommend_by_index(index, row, k),
        None => Vec::new(),
    }
}

/// Neighbors of the entry at catalog row `row`; empty if out of range
pub fn recommend_by_index(index: &DataIndex, row: usize, k: usize) -> Vec<Candidate> {
    let Some(scores) = index.similarity_row(row) else {
        return Vec::new();
    };

    rank_row(scores, Some(row), k)
        .into_iter()
        .filter_map(|(column, score)| {
            let entry = index.get_entry(column)?;
            Some(Candidate::new(column, entry.id, score))
        })
        .collect()
}

/// Lookup service holding the shared index
#[derive(Clone)]
pub struct SimilarSource {
    /// Shared reference to the data index (read-only, so no Mutex needed)
    data_index: Arc<DataIndex>,

    /// Result count used by `similar_to`
    default_limit: usize,
}

impl SimilarSource {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            data_index,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Configure the default number of results (default: 5)
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    /// Neighbors of `title` using the default limit
    pub fn similar_to(&self, title: &str) -> Vec<Candidate> {
        self.get_candidates(title, self.default_limit)
    }

    /// Neighbors of `title`, best first, at most `limit`
    #[instrument(skip(self))]
    pub fn get_candidates(&self, title: &str, limit: usize) -> Vec<Candidate> {
        let candidates = recommend_scored(&self.data_index, title, limit);
        debug!("Generated {} similar candidates", candidates.len());
        candidates
    }

    /// Neighbors of the entry with `movie_id`
    pub fn get_candidates_by_id(&self, movie_id: MovieId, limit: usize) -> Vec<Candidate> {
        recommend_by_id(&self.data_index, movie_id, limit)
    }
}
