//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(collection: Option<String>, settings: Settings) -> Result<()> {
    let collection =
        collection.unwrap_or_else(|| settings.vector_store.default_collection.clone());

    let orchestrator = Orchestrator::new(settings)?;
    let index = orchestrator.index(&collection);

    match index.list_sources().await {
        Ok(sources) => {
            if sources.is_empty() {
                Output::info(&format!(
                    "No documents in collection '{}' yet. Use 'lese ingest <file.pdf>' to add content.",
                    collection
                ));
            } else {
                Output::header(&format!("Indexed documents in '{}' ({})", collection, sources.len()));
                println!();

                for item in &sources {
                    Output::source_info(&item.source, item.chunk_count, item.max_page);
                }

                let total_chunks: u32 = sources.iter().map(|s| s.chunk_count).sum();
                println!();
                Output::kv("Total documents", &sources.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list documents: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
