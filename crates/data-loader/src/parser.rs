//! Parsers for the two JSON artifacts.
//!
//! - movie_list.json: mapping of column name -> column values
//!     `{"movie_id": [19995, 285], "title": ["Avatar", "Pirates..."], "tags": [..]}`
//!   A column may also be an object keyed by integer row labels, which is how
//!   a pandas frame dumps with `to_dict()`:
//!     `{"movie_id": {"0": 19995, "1": 285}, "title": {"0": "Avatar", ..}}`
//! - similarity.json: 2D array of numbers, one inner array per catalog row

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Columns that may carry the movie id, in order of preference
const ID_COLUMNS: [&str; 2] = ["id", "movie_id"];
const TITLE_COLUMN: &str = "title";

/// One catalog column as it appears in the artifact
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Column {
    Positional(Vec<Value>),
    Labeled(serde_json::Map<String, Value>),
}

/// Read an artifact into memory, reporting a missing file distinctly
fn read_artifact(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the catalog artifact at `path`
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = read_artifact(path)?;
    parse_catalog_str(&content, &file_label(path))
}

/// Parse catalog JSON; `file` is only used in error messages
pub fn parse_catalog_str(content: &str, file: &str) -> Result<Catalog> {
    let columns: BTreeMap<String, Column> =
        serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            reason: e.to_string(),
        })?;

    let mut columns: BTreeMap<String, Vec<Value>> = normalize_columns(columns, file)?;

    let id_column = ID_COLUMNS
        .iter()
        .find(|name| columns.contains_key(**name))
        .ok_or_else(|| DataLoadError::MissingColumn {
            file: file.to_string(),
            column: ID_COLUMNS.join(" or "),
        })?
        .to_string();

    let ids = columns
        .remove(&id_column)
        .unwrap_or_default();
    let titles = columns
        .remove(TITLE_COLUMN)
        .ok_or_else(|| DataLoadError::MissingColumn {
            file: file.to_string(),
            column: TITLE_COLUMN.to_string(),
        })?;

    let mut entries = Vec::with_capacity(ids.len());
    for (row, (id_value, title_value)) in ids.into_iter().zip(titles).enumerate() {
        let id = parse_id(&id_value, row)?;
        let title = match title_value {
            Value::String(title) => title,
            other => {
                return Err(DataLoadError::InvalidValue {
                    field: TITLE_COLUMN.to_string(),
                    row,
                    value: other.to_string(),
                });
            }
        };

        // Remaining columns become auxiliary attributes
        let extra = columns
            .iter()
            .map(|(name, values)| (name.clone(), values[row].clone()))
            .collect();

        entries.push(CatalogEntry { id, title, extra });
    }

    Catalog::from_entries(entries)
}

/// Turn every column into a positional vector and check they all line up
fn normalize_columns(
    columns: BTreeMap<String, Column>,
    file: &str,
) -> Result<BTreeMap<String, Vec<Value>>> {
    let mut normalized = BTreeMap::new();
    // Row labels of the first column seen; every other column must match
    let mut expected_labels: Option<(String, Vec<usize>)> = None;

    for (name, column) in columns {
        let (labels, values) = match column {
            Column::Positional(values) => ((0..values.len()).collect(), values),
            Column::Labeled(map) => {
                let mut rows = Vec::with_capacity(map.len());
                for (label, value) in map {
                    let row: usize = label.parse().map_err(|_| DataLoadError::ParseError {
                        file: file.to_string(),
                        reason: format!("column '{}' has non-integer row label '{}'", name, label),
                    })?;
                    rows.push((row, value));
                }
                // Keys arrive in lexical order ("10" < "2"), rows follow numeric order
                rows.sort_by_key(|(row, _)| *row);
                rows.into_iter().unzip()
            }
        };

        match &expected_labels {
            None => expected_labels = Some((name.clone(), labels)),
            Some((first, expected)) => {
                if labels.len() != expected.len() {
                    return Err(DataLoadError::ColumnLengthMismatch {
                        column: name,
                        expected: expected.len(),
                        found: labels.len(),
                    });
                }
                if &labels != expected {
                    return Err(DataLoadError::ParseError {
                        file: file.to_string(),
                        reason: format!("column '{}' row labels differ from column '{}'", name, first),
                    });
                }
            }
        }

        normalized.insert(name, values);
    }

    Ok(normalized)
}

/// Movie ids must be non-negative integers that fit a `MovieId`.
///
/// Integral floats (`19995.0`) are accepted since dataframe dumps sometimes
/// widen integer columns.
fn parse_id(value: &Value, row: usize) -> Result<MovieId> {
    let invalid = || DataLoadError::InvalidValue {
        field: "id".to_string(),
        row,
        value: value.to_string(),
    };

    let raw = match value {
        Value::Number(n) => match n.as_u64() {
            Some(v) => v,
            None => {
                let f = n.as_f64().ok_or_else(invalid)?;
                if f < 0.0 || f.fract() != 0.0 {
                    return Err(invalid());
                }
                f as u64
            }
        },
        _ => return Err(invalid()),
    };

    MovieId::try_from(raw).map_err(|_| invalid())
}

/// Parse the similarity artifact at `path`
pub fn parse_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let content = read_artifact(path)?;
    parse_similarity_str(&content, &file_label(path))
}

/// Parse similarity JSON; `file` is only used in error messages
pub fn parse_similarity_str(content: &str, file: &str) -> Result<SimilarityMatrix> {
    let rows: Vec<Vec<f64>> =
        serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            reason: e.to_string(),
        })?;
    SimilarityMatrix::from_rows(rows)
}
