//! # Data Loader Crate
//!
//! This crate loads the two precomputed artifacts behind the similar-titles
//! lookup and pairs them into one immutable handle.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (CatalogEntry, Catalog, SimilarityMatrix, DataIndex)
//! - **parser**: Parse the JSON artifacts into Rust structs
//! - **index**: Build and validate the DataIndex
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! // Load movie_list.json + similarity.json
//! let index = DataIndex::load_from_files(Path::new("artifacts"))?;
//!
//! let row = index.index_of_title("Avatar").unwrap();
//! let scores = index.similarity_row(row).unwrap();
//! println!("{} scores for {}", scores.len(), index.get_entry(row).unwrap().title);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{CATALOG_FILE, SCORE_TOLERANCE, SIMILARITY_FILE};
pub use types::{
    // Type aliases
    MovieId,
    // Core types
    CatalogEntry,
    Catalog,
    SimilarityMatrix,
    DataIndex,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let index = DataIndex::new(Catalog::default(), SimilarityMatrix::default()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.counts(), (0, 0));
        assert!(index.similarity_row(0).is_none());
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first_row() {
        let titles = ["P", "Q", "X", "R", "S", "T", "U", "X"];
        let entries = titles
            .iter()
            .enumerate()
            .map(|(i, t)| CatalogEntry::new(i as MovieId + 1, *t))
            .collect();
        let catalog = Catalog::from_entries(entries).unwrap();

        assert_eq!(catalog.index_of_title("X"), Some(2));
        assert_eq!(catalog.index_of_id(8), Some(7));
        assert_eq!(catalog.duplicate_title_count(), 1);
    }

    #[test]
    fn test_catalog_entry_serializes_with_extra_columns() {
        let mut entry = CatalogEntry::new(19995, "Avatar");
        entry
            .extra
            .insert("tags".to_string(), serde_json::json!("culture clash future"));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 19995);
        assert_eq!(json["title"], "Avatar");
        assert_eq!(json["tags"], "culture clash future");

        let back: CatalogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new(Catalog::default(), SimilarityMatrix::default()).unwrap();

        assert!(index.get_entry(0).is_none());
        assert!(index.get_movie(999).is_none());
        assert!(index.index_of_title("__unknown__").is_none());
        assert!(!index.contains_title("__unknown__"));
    }
}
