use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::DataIndex;
use metadata_client::OfflineMetadata;
use server::{Config, MovieRecommendation, RecommendationOrchestrator, SelectedMovie};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Maximum number of titles printed by `search`
const SEARCH_RESULT_LIMIT: usize = 20;

/// ReelRecs - Similar Movie Finder
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Find movies similar to one you like, using a precomputed similarity matrix", long_about = None)]
struct Cli {
    /// Directory holding movie_list.json and similarity.json (overrides ARTIFACT_DIR)
    #[arg(short, long)]
    artifact_dir: Option<PathBuf>,

    /// Skip TMDB lookups even if an API key is configured
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the movies most similar to a title
    Recommend {
        /// Exact catalog title of the selected movie
        #[arg(long)]
        title: String,

        /// Number of recommendations to return (default: RECOMMENDATION_COUNT)
        #[arg(long)]
        limit: Option<usize>,

        /// Show the similarity score and TMDB link for each recommendation
        #[arg(long)]
        explain: bool,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details for one movie
    Details {
        /// Exact catalog title
        #[arg(long)]
        title: String,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// List catalog titles in artifact order
    List {
        /// Number of titles to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(artifact_dir) = cli.artifact_dir {
        config.artifact_dir = artifact_dir;
    }

    // Load artifacts (this may take a moment). Progress goes to stderr,
    // stdout carries only command output
    eprintln!("Loading artifacts from {}...", config.artifact_dir.display());
    let start = Instant::now();
    let orchestrator = build_orchestrator(&config, cli.offline)?;
    eprintln!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        orchestrator.data_index().len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            explain,
            json,
        } => {
            let limit = limit.unwrap_or(orchestrator.default_limit());
            handle_recommend(&orchestrator, &title, limit, explain, json).await?
        }
        Commands::Details { title } => handle_details(&orchestrator, &title).await?,
        Commands::Search { title } => handle_search(orchestrator.data_index(), &title)?,
        Commands::List { limit } => handle_list(orchestrator.data_index(), limit),
        Commands::Benchmark { requests } => handle_benchmark(orchestrator, requests).await?,
    }

    Ok(())
}

/// Build the orchestrator, forcing offline metadata when asked to
fn build_orchestrator(config: &Config, offline: bool) -> Result<RecommendationOrchestrator> {
    if !offline {
        return RecommendationOrchestrator::from_config(config);
    }

    info!("Offline mode, TMDB lookups disabled");
    let data_index = server::load_data_index(config)?;
    Ok(RecommendationOrchestrator::new(data_index, Arc::new(OfflineMetadata))
        .with_default_limit(config.recommendation_count))
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    title: &str,
    limit: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", render_json(orchestrator, title, limit).await?);
        return Ok(());
    }

    if !orchestrator.data_index().contains_title(title) {
        println!(
            "{} Movie {:?} not found (try `reel-recs search --title ...`)",
            "!".yellow(),
            title
        );
        return Ok(());
    }

    let recommendations = orchestrator.get_recommendations(title, limit).await?;
    print_recommendations(title, &recommendations, explain);
    Ok(())
}

/// Handle the 'details' command
async fn handle_details(orchestrator: &RecommendationOrchestrator, title: &str) -> Result<()> {
    match orchestrator.get_movie_details(title).await? {
        Some(selected) => print_selected(&selected),
        None => println!("{} Movie {:?} not found", "!".yellow(), title),
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(data_index: &DataIndex, title: &str) -> Result<()> {
    let matches = data_index.search_titles(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
        return Ok(());
    }

    for entry in matches.iter().take(SEARCH_RESULT_LIMIT) {
        println!("{}: {}", entry.id.to_string().green(), entry.title);
    }
    if matches.len() > SEARCH_RESULT_LIMIT {
        println!("  ... and {} more", matches.len() - SEARCH_RESULT_LIMIT);
    }
    Ok(())
}

/// Handle the 'list' command
fn handle_list(data_index: &DataIndex, limit: Option<usize>) {
    let limit = limit.unwrap_or(data_index.len());
    for (i, title) in data_index.titles().take(limit).enumerate() {
        println!("{:>6}  {}", i, title);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(orchestrator: RecommendationOrchestrator, requests: usize) -> Result<()> {
    let catalog_len = orchestrator.data_index().len();
    if catalog_len == 0 || requests == 0 {
        println!("Nothing to benchmark");
        return Ok(());
    }

    // Pick random catalog titles
    let titles: Vec<String> = (0..requests)
        .filter_map(|_| {
            let row = rand::random::<u64>() as usize % catalog_len;
            orchestrator.data_index().get_entry(row).map(|e| e.title.clone())
        })
        .collect();

    // Use tokio::spawn to make concurrent requests
    let wall_clock = Instant::now();
    let limit = orchestrator.default_limit();
    let mut handles = Vec::with_capacity(titles.len());
    for title in titles {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.get_recommendations(&title, limit).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / timings.len() as u32;
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", timings.len());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Recommendations for `title` as a JSON array; `[]` for an unknown title
async fn render_json(
    orchestrator: &RecommendationOrchestrator,
    title: &str,
    limit: usize,
) -> Result<String> {
    let recommendations = orchestrator.get_recommendations(title, limit).await?;
    serde_json::to_string_pretty(&json_summary(&recommendations))
        .context("Failed to serialize recommendations")
}

/// `[{id, title}]`, the shape callers of the lookup consume
fn json_summary(recommendations: &[MovieRecommendation]) -> serde_json::Value {
    recommendations
        .iter()
        .map(|rec| serde_json::json!({ "id": rec.movie_id, "title": rec.title }))
        .collect()
}

/// Nearest-rank percentile over sorted timings
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = ((sorted.len() as f64 * p).ceil() as usize).clamp(1, sorted.len());
    sorted[rank - 1]
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[MovieRecommendation], explain: bool) {
    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    if recommendations.is_empty() {
        println!("  (no other movies in the catalog)");
        return;
    }

    for (i, rec) in recommendations.iter().enumerate() {
        let rank = i + 1;
        match &rec.details {
            Some(details) => println!(
                "{}. {} [{}] - Rating: {:.1}",
                rank.to_string().green(),
                rec.title,
                details.genres.join(", "),
                details.rating
            ),
            None => println!(
                "{}. {} {}",
                rank.to_string().green(),
                rec.title,
                "(details unavailable)".dimmed()
            ),
        }
        println!("   Poster: {}", rec.poster_or_placeholder());
        if explain {
            println!("   {} | {}", rec.explanation(), rec.tmdb_url);
            if let Some(details) = rec.details.as_ref().filter(|d| !d.overview.is_empty()) {
                println!("   {}", details.overview);
            }
        }
    }
}

fn print_selected(selected: &SelectedMovie) {
    println!("{}", selected.title.bold().blue());
    println!("{}TMDB id: {}", "• ".green(), selected.movie_id);
    println!("{}Link: {}", "• ".green(), selected.tmdb_url);

    let Some(details) = &selected.details else {
        println!("{}", "Details unavailable".yellow());
        return;
    };
    println!("{}Rating: {:.1}", "• ".cyan(), details.rating);
    println!("{}Genres: {}", "• ".cyan(), details.genres.join(", "));
    println!("{}Poster: {}", "• ".cyan(), details.poster_or_placeholder());
    if !details.overview.is_empty() {
        println!();
        println!("{}", details.overview);
    }
}
