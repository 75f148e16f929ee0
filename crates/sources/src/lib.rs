//! # Sources Crate
//!
//! Similar-titles lookup: given a movie, find its nearest neighbors in the
//! precomputed similarity matrix.
//!
//! ## Components
//!
//! - **ranking**: deterministic top-K selection over one matrix row
//! - **similar**: title / id / row lookups and the `SimilarSource` service
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{recommend, SimilarSource};
//! use data_loader::DataIndex;
//! use std::sync::Arc;
//!
//! let data_index = Arc::new(DataIndex::load_from_files("artifacts".as_ref())?);
//!
//! // Plain function over the handle
//! for entry in recommend(&data_index, "Avatar", 5) {
//!     println!("{} ({})", entry.title, entry.id);
//! }
//!
//! // Or a cloneable service for async callers
//! let source = SimilarSource::new(data_index.clone());
//! let candidates = source.similar_to("Avatar");
//! ```
//!
//! ## Performance
//!
//! One lookup is O(n + k log k) in the catalog size n; a few thousand
//! entries take microseconds.

// Public modules
pub mod types;
pub mod ranking;
pub mod similar;

// Re-export commonly used types
pub use types::Candidate;
pub use ranking::rank_row;
pub use similar::{
    recommend, recommend_by_id, recommend_by_index, recommend_scored, SimilarSource, DEFAULT_LIMIT,
};
