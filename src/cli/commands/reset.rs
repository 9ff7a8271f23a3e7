//! Reset command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the reset command.
pub async fn run_reset(collection: Option<String>, settings: Settings) -> Result<()> {
    let collection =
        collection.unwrap_or_else(|| settings.vector_store.default_collection.clone());

    let orchestrator = Orchestrator::new(settings)?;
    let index = orchestrator.index(&collection);

    let before = index.count().await.unwrap_or(0);
    index.reset().await?;

    Output::success(&format!(
        "Reset collection '{}' ({} records removed).",
        collection, before
    ));

    Ok(())
}
