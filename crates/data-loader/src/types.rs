//! Core domain types for the similar-titles catalog.
//!
//! - `CatalogEntry`: one movie record (id, title, auxiliary columns)
//! - `Catalog`: the ordered entries plus title and id lookup tables
//! - `SimilarityMatrix`: dense, row-major square matrix of scores
//! - `DataIndex`: the immutable handle pairing the two

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (the TMDB id in the shipped artifacts)
pub type MovieId = u32;

// =============================================================================
// Catalog
// =============================================================================

/// A single movie record from the catalog artifact.
///
/// Serializes as `{ "id": .., "title": .., <extra columns> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: MovieId,
    pub title: String,
    /// Every catalog column other than the id and the title, keyed by column name
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CatalogEntry {
    /// Create an entry with no auxiliary attributes
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Ordered collection of catalog entries.
///
/// Position in `entries` is the canonical row index into the
/// [`SimilarityMatrix`]. Titles are not unique: `index_of_title` returns the
/// first entry carrying the title. Ids are unique and enforced at construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// Title -> first row with that title
    title_index: HashMap<String, usize>,
    /// Movie id -> row
    id_index: HashMap<MovieId, usize>,
    duplicate_titles: usize,
}

impl Catalog {
    /// Build a catalog and its lookup tables from entries in row order
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut title_index = HashMap::with_capacity(entries.len());
        let mut id_index = HashMap::with_capacity(entries.len());
        let mut duplicate_titles = 0;

        for (row, entry) in entries.iter().enumerate() {
            if let Some(&first) = id_index.get(&entry.id) {
                return Err(DataLoadError::DuplicateId {
                    id: entry.id,
                    first,
                    second: row,
                });
            }
            id_index.insert(entry.id, row);

            // First occurrence wins
            if title_index.contains_key(&entry.title) {
                duplicate_titles += 1;
            } else {
                title_index.insert(entry.title.clone(), row);
            }
        }

        Ok(Self {
            entries,
            title_index,
            id_index,
            duplicate_titles,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the entry at a row index
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// All entries in row order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Row index of the first entry whose title matches exactly
    pub fn index_of_title(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    /// Row index of the entry with this id
    pub fn index_of_id(&self, id: MovieId) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    /// Number of entries whose title was already used by an earlier row
    pub fn duplicate_title_count(&self) -> usize {
        self.duplicate_titles
    }
}

// =============================================================================
// Similarity Matrix
// =============================================================================

/// Dense square matrix of pairwise similarity scores.
///
/// Stored as one contiguous row-major buffer; row `i` scores catalog entry `i`
/// against every other entry.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build a matrix from nested rows, rejecting ragged or non-square input
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.len();
        let mut scores = Vec::with_capacity(dim * dim);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(DataLoadError::DimensionMismatch {
                    reason: format!("row {} length", i),
                    expected: dim,
                    found: row.len(),
                });
            }
            scores.extend(row);
        }

        Ok(Self { dim, scores })
    }

    /// Build a matrix from a row-major buffer of `dim * dim` scores
    pub fn from_flat(dim: usize, scores: Vec<f64>) -> Result<Self> {
        if scores.len() != dim * dim {
            return Err(DataLoadError::DimensionMismatch {
                reason: "flat buffer length".to_string(),
                expected: dim * dim,
                found: scores.len(),
            });
        }
        Ok(Self { dim, scores })
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Borrow row `i`
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.dim {
            return None;
        }
        let start = i * self.dim;
        Some(&self.scores[start..start + self.dim])
    }

    /// Score between entries `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if j >= self.dim {
            return None;
        }
        self.row(i).map(|row| row[j])
    }
}

// =============================================================================
// DataIndex - The Immutable Handle
// =============================================================================

/// Catalog and similarity matrix, loaded once and shared read-only.
///
/// Only constructed through validated constructors (see `index.rs`), so row
/// `i` of the matrix always corresponds to catalog entry `i`. Wrap it in an
/// `Arc` to share it across tasks; no locking is needed since nothing
/// mutates it after load.
#[derive(Debug)]
pub struct DataIndex {
    pub(crate) catalog: Catalog,
    pub(crate) similarity: SimilarityMatrix,
}

impl DataIndex {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Get a catalog entry by row index
    pub fn get_entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.catalog.get(index)
    }

    /// Get a catalog entry by movie id
    pub fn get_movie(&self, id: MovieId) -> Option<&CatalogEntry> {
        self.catalog
            .index_of_id(id)
            .and_then(|index| self.catalog.get(index))
    }

    /// Row index of the first entry with this exact title
    pub fn index_of_title(&self, title: &str) -> Option<usize> {
        self.catalog.index_of_title(title)
    }

    pub fn index_of_id(&self, id: MovieId) -> Option<usize> {
        self.catalog.index_of_id(id)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.catalog.index_of_title(title).is_some()
    }

    /// Similarity scores of entry `index` against every entry
    pub fn similarity_row(&self, index: usize) -> Option<&[f64]> {
        self.similarity.row(index)
    }

    /// Titles in catalog order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.catalog.entries().iter().map(|e| e.title.as_str())
    }

    /// Get counts for debugging/validation: (entries, matrix dimension)
    pub fn counts(&self) -> (usize, usize) {
        (self.catalog.len(), self.similarity.dim())
    }
}
