//! Types shared by the lookup functions.

use data_loader::MovieId;
use serde::Serialize;

/// One ranked neighbor of the queried entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    /// Row of the neighbor in the catalog / similarity matrix
    pub index: usize,
    pub movie_id: MovieId,
    /// Similarity between the queried entry and this neighbor
    pub score: f64,
}

impl Candidate {
    pub fn new(index: usize, movie_id: MovieId, score: f64) -> Self {
        Self {
            index,
            movie_id,
            score,
        }
    }
}
