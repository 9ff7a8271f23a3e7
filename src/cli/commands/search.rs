//! Search command implementation.
//!
//! Debug-facing retrieval: runs the index query directly, without answer
//! generation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::vector_store::QueryOptions;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    collection: Option<String>,
    limit: usize,
    min_relevance: Option<f32>,
    no_diversify: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let collection =
        collection.unwrap_or_else(|| settings.vector_store.default_collection.clone());

    let orchestrator = Orchestrator::new(settings.clone())?;
    let index = orchestrator.index(&collection);

    let opts = QueryOptions {
        k: limit,
        min_relevance,
        diversify: !no_diversify,
        per_page_cap: settings.rag.per_page_cap,
    };

    let spinner = Output::spinner("Searching...");

    let results = index.query(query, &opts).await;
    spinner.finish_and_clear();

    match results {
        Ok(blocks) => {
            if blocks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", blocks.len()));

                for block in &blocks {
                    Output::search_result(&block.source, block.page, block.score, &block.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
