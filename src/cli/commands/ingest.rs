//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::PathBuf;

/// Run the ingest command.
#[allow(clippy::too_many_arguments)]
pub async fn run_ingest(
    paths: &[String],
    collection: Option<String>,
    reset: bool,
    chunker: Option<String>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if paths.is_empty() {
        Output::error("No input files given.");
        Output::info("Usage: lese ingest <file.pdf> [<file.pdf> ...]");
        return Err(anyhow::anyhow!("no input files"));
    }

    let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    let has_pdfs = paths.iter().any(|p| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    });

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ingest { has_pdfs }) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    // Apply command-line chunking overrides
    if let Some(strategy) = chunker {
        settings.chunking.strategy = strategy;
    }
    if let Some(size) = chunk_size {
        settings.chunking.chunk_size = size;
    }
    if let Some(overlap) = chunk_overlap {
        settings.chunking.chunk_overlap = overlap;
    }

    let collection =
        collection.unwrap_or_else(|| settings.vector_store.default_collection.clone());

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!(
        "Ingesting {} document(s) into '{}'...",
        paths.len(),
        collection
    ));

    match orchestrator.ingest(&paths, &collection, reset).await {
        Ok(0) => {
            spinner.finish_and_clear();
            Output::warning("Indexed 0 chunks (likely image-only/scanned PDFs).");
            Output::info("Try a text-based PDF, or run OCR on the document first.");
        }
        Ok(count) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed {} chunks into collection '{}'.",
                count, collection
            ));
            let total = orchestrator.index(&collection).count().await.unwrap_or(0);
            Output::kv("Collection total", &total.to_string());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
