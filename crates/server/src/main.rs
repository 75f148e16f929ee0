//! Simple test harness for the recommendation orchestrator.
//!
//! Loads the artifacts named by the environment and prints the similar
//! titles for the movie given as the first argument (or the first catalog
//! entry when none is given).

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use server::{Config, RecommendationOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,sources=debug")),
        )
        .init();

    info!("Starting ReelRecs server test harness");

    let config = Config::from_env()?;
    info!("Loading artifacts from {}", config.artifact_dir.display());
    let orchestrator = RecommendationOrchestrator::from_config(&config)?;

    let title = match std::env::args().nth(1) {
        Some(title) => title,
        None => orchestrator
            .data_index()
            .titles()
            .next()
            .map(str::to_string)
            .context("Catalog is empty")?,
    };
    let limit = orchestrator.default_limit();

    if let Some(selected) = orchestrator.get_movie_details(&title).await? {
        info!("Selected: {} ({})", selected.title, selected.tmdb_url);
        if let Some(details) = &selected.details {
            info!("   {}", details.overview);
        }
    } else {
        warn!("{:?} is not in the catalog", title);
    }

    info!("Getting recommendations for {:?} (limit: {})", title, limit);
    let recommendations = orchestrator.get_recommendations(&title, limit).await?;

    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        info!("{}. {} - Score: {:.3}", i + 1, rec.title, rec.score);
        info!("   Poster: {}", rec.poster_or_placeholder());
        if let Some(details) = &rec.details {
            info!("   Genres: {}", details.genres.join(", "));
        }
    }

    Ok(())
}
