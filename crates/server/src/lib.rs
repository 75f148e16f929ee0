//! Server crate for the ReelRecs similar-titles engine.
//!
//! This crate wires the loaded artifacts, the similarity lookup and the
//! metadata provider into one request path, and owns runtime configuration.

pub mod config;
pub mod orchestrator;

pub use config::Config;
pub use orchestrator::{
    build_metadata_provider, load_data_index, MovieRecommendation, RecommendationOrchestrator,
    SelectedMovie,
};
