//! Lese CLI entry point.

use anyhow::Result;
use clap::Parser;
use lese::cli::{commands, Cli, Commands};
use lese::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lese={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Ingest {
            paths,
            collection,
            reset,
            chunker,
            chunk_size,
            chunk_overlap,
        } => {
            commands::run_ingest(
                paths,
                collection.clone(),
                *reset,
                chunker.clone(),
                *chunk_size,
                *chunk_overlap,
                settings,
            )
            .await?;
        }

        Commands::Ask {
            question,
            collection,
            top_k,
            min_relevance,
            model,
            sources,
            json,
        } => {
            commands::run_ask(
                question,
                collection.clone(),
                *top_k,
                *min_relevance,
                model.clone(),
                *sources,
                *json,
                settings,
            )
            .await?;
        }

        Commands::Search {
            query,
            collection,
            limit,
            min_relevance,
            no_diversify,
        } => {
            commands::run_search(
                query,
                collection.clone(),
                *limit,
                *min_relevance,
                *no_diversify,
                settings,
            )
            .await?;
        }

        Commands::List { collection } => {
            commands::run_list(collection.clone(), settings).await?;
        }

        Commands::Reset { collection } => {
            commands::run_reset(collection.clone(), settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
