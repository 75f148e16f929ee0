//! DataIndex building and validation.
//!
//! Loads the two artifacts, checks that they describe the same catalog,
//! and checks the matrix invariants the lookup relies on:
//! - square, one row per catalog entry
//! - every score finite
//! - symmetric
//! - each row's diagonal entry is the row maximum

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// File name of the catalog artifact inside an artifact directory
pub const CATALOG_FILE: &str = "movie_list.json";
/// File name of the similarity artifact inside an artifact directory
pub const SIMILARITY_FILE: &str = "similarity.json";

/// Absolute slack allowed when comparing scores for symmetry and diagonal dominance
pub const SCORE_TOLERANCE: f64 = 1e-6;

impl DataIndex {
    /// Load `movie_list.json` and `similarity.json` from a directory
    pub fn load_from_files(artifact_dir: &Path) -> Result<Self> {
        info!("Loading artifacts from {:?}", artifact_dir);
        Self::load_from_paths(
            &artifact_dir.join(CATALOG_FILE),
            &artifact_dir.join(SIMILARITY_FILE),
        )
    }

    /// Load the catalog and similarity artifacts from explicit paths
    pub fn load_from_paths(catalog_path: &Path, similarity_path: &Path) -> Result<Self> {
        // The matrix dominates load time, parse both at once
        let (catalog, similarity) = rayon::join(
            || parser::parse_catalog(catalog_path),
            || parser::parse_similarity(similarity_path),
        );
        let catalog = catalog?;
        let similarity = similarity?;

        info!(
            "Parsed {} catalog entries and a {}x{} similarity matrix",
            catalog.len(),
            similarity.dim(),
            similarity.dim()
        );

        let index = Self::new(catalog, similarity)?;
        info!("DataIndex successfully built and validated");
        Ok(index)
    }

    /// Pair a catalog with its similarity matrix, validating both
    pub fn new(catalog: Catalog, similarity: SimilarityMatrix) -> Result<Self> {
        let index = Self {
            catalog,
            similarity,
        };
        index.validate()?;

        let duplicates = index.catalog.duplicate_title_count();
        if duplicates > 0 {
            warn!(
                "{} catalog entries share a title with an earlier entry; title lookups resolve to the first",
                duplicates
            );
        }
        Ok(index)
    }

    /// Validate matrix shape and score invariants
    ///
    /// Returns Ok(()) if valid, Err describing the first violation otherwise
    pub fn validate(&self) -> Result<()> {
        let dim = self.similarity.dim();
        if dim != self.catalog.len() {
            return Err(DataLoadError::DimensionMismatch {
                reason: "similarity matrix rows vs catalog entries".to_string(),
                expected: self.catalog.len(),
                found: dim,
            });
        }

        // Rows are independent; report the lowest failing row for stable messages
        let violation = (0..dim)
            .into_par_iter()
            .filter_map(|i| self.check_row(i).err().map(|reason| (i, reason)))
            .min_by_key(|(i, _)| *i);

        match violation {
            Some((_, reason)) => Err(DataLoadError::ValidationError(reason)),
            None => Ok(()),
        }
    }

    fn check_row(&self, i: usize) -> std::result::Result<(), String> {
        let row = self.similarity.row(i).unwrap_or(&[]);

        if let Some(j) = row.iter().position(|s| !s.is_finite()) {
            return Err(format!("score ({}, {}) is not finite: {}", i, j, row[j]));
        }

        let diagonal = row[i];
        for (j, &score) in row.iter().enumerate() {
            if score > diagonal + SCORE_TOLERANCE {
                return Err(format!(
                    "row {} has score {} at column {} above its self-similarity {}",
                    i, score, j, diagonal
                ));
            }
            // Only compare each pair once
            if j > i {
                let mirrored = self.similarity.get(j, i).unwrap_or(f64::NAN);
                if !((score - mirrored).abs() <= SCORE_TOLERANCE) {
                    return Err(format!(
                        "matrix is not symmetric at ({}, {}): {} vs {}",
                        i, j, score, mirrored
                    ));
                }
            }
        }
        Ok(())
    }

    /// Case-insensitive substring search over titles
    ///
    /// Exact (case-insensitive) matches come first, then substring matches;
    /// within each group entries keep catalog order.
    pub fn search_titles(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.to_lowercase();
        let mut matches: Vec<(u8, usize, &CatalogEntry)> = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(row, entry)| {
                let title = entry.title.to_lowercase();
                if title == query {
                    Some((0, row, entry))
                } else if title.contains(&query) {
                    Some((1, row, entry))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by_key(|(rank, row, _)| (*rank, *row));
        matches.into_iter().map(|(_, _, entry)| entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(titles: &[&str]) -> Catalog {
        let entries = titles
            .iter()
            .enumerate()
            .map(|(i, title)| CatalogEntry::new(i as MovieId + 1, *title))
            .collect();
        Catalog::from_entries(entries).unwrap()
    }

    fn symmetric_matrix() -> SimilarityMatrix {
        SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.3, 0.2],
            vec![0.3, 1.0, 0.6],
            vec![0.2, 0.6, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_index() {
        let index = DataIndex::new(catalog(&["A", "B", "C"]), symmetric_matrix()).unwrap();
        assert_eq!(index.counts(), (3, 3));
        assert_eq!(index.similarity_row(1), Some(&[0.3, 1.0, 0.6][..]));
        assert_eq!(index.get_movie(3).unwrap().title, "C");
    }

    #[test]
    fn test_dimension_mismatch_with_catalog() {
        let err = DataIndex::new(catalog(&["A", "B"]), symmetric_matrix()).unwrap_err();
        assert!(matches!(err, DataLoadError::DimensionMismatch { expected: 2, found: 3, .. }));
    }

    #[test]
    fn test_asymmetric_matrix_rejected() {
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.3],
            vec![0.4, 1.0],
        ])
        .unwrap();
        let err = DataIndex::new(catalog(&["A", "B"]), matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(ref msg) if msg.contains("symmetric")));
    }

    #[test]
    fn test_diagonal_must_be_row_maximum() {
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![0.5, 0.9],
            vec![0.9, 1.0],
        ])
        .unwrap();
        let err = DataIndex::new(catalog(&["A", "B"]), matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(ref msg) if msg.contains("self-similarity")));
    }

    #[test]
    fn test_tied_diagonal_within_tolerance_is_accepted() {
        // Identical descriptions produce off-diagonal scores equal to the diagonal
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 1.0 + 1e-9],
            vec![1.0 + 1e-9, 1.0],
        ])
        .unwrap();
        assert!(DataIndex::new(catalog(&["A", "B"]), matrix).is_ok());
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let matrix = SimilarityMatrix::from_flat(2, vec![1.0, f64::NAN, f64::NAN, 1.0]).unwrap();
        let err = DataIndex::new(catalog(&["A", "B"]), matrix).unwrap_err();
        assert!(matches!(err, DataLoadError::ValidationError(ref msg) if msg.contains("not finite")));
    }

    #[test]
    fn test_search_titles_ranks_exact_match_first() {
        let matrix = SimilarityMatrix::from_flat(
            3,
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        let index = DataIndex::new(catalog(&["Avatar 2", "Up", "Avatar"]), matrix).unwrap();

        let results: Vec<&str> = index
            .search_titles("avatar")
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(results, vec!["Avatar", "Avatar 2"]);
        assert!(index.search_titles("nothing like this").is_empty());
    }

    #[test]
    fn test_load_missing_artifacts() {
        let err = DataIndex::load_from_files(Path::new("does/not/exist")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    /// Fresh per-test artifact directory under the system temp dir
    fn artifact_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("reel-recs-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const LABELLED_CATALOG: &str = r#"{
        "movie_id": {"0": 19995, "1": 285, "2": 206647},
        "title": {"0": "Avatar", "1": "Pirates of the Caribbean: At World's End", "2": "Spectre"},
        "tags": {"0": "space", "1": "pirates", "2": "spy"}
    }"#;

    const MATRIX: &str = "[[1.0, 0.3, 0.2], [0.3, 1.0, 0.6], [0.2, 0.6, 1.0]]";

    #[test]
    fn test_load_from_files() {
        let dir = artifact_dir("load");
        std::fs::write(dir.join(CATALOG_FILE), LABELLED_CATALOG).unwrap();
        std::fs::write(dir.join(SIMILARITY_FILE), MATRIX).unwrap();

        let index = DataIndex::load_from_files(&dir).unwrap();

        assert_eq!(index.counts(), (3, 3));
        assert_eq!(index.index_of_title("Spectre"), Some(2));
        assert_eq!(index.get_movie(285).unwrap().extra["tags"], "pirates");
        assert_eq!(index.similarity_row(1).unwrap(), &[0.3, 1.0, 0.6]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_with_missing_similarity_artifact() {
        let dir = artifact_dir("missing-matrix");
        std::fs::write(dir.join(CATALOG_FILE), LABELLED_CATALOG).unwrap();

        let err = DataIndex::load_from_files(&dir).unwrap_err();

        match err {
            DataLoadError::FileNotFound { path } => assert!(path.ends_with(SIMILARITY_FILE)),
            other => panic!("expected FileNotFound, got {:?}", other),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_reports_file_name_on_parse_error() {
        let dir = artifact_dir("bad-matrix");
        std::fs::write(dir.join(CATALOG_FILE), LABELLED_CATALOG).unwrap();
        std::fs::write(dir.join(SIMILARITY_FILE), "[[1.0, 0.3,").unwrap();

        let err = DataIndex::load_from_files(&dir).unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { ref file, .. } if file == SIMILARITY_FILE));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
