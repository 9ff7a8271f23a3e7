//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::llm::OpenAIChat;
use crate::orchestrator::Orchestrator;
use crate::rag::{AskOptions, RagEngine};
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
#[allow(clippy::too_many_arguments)]
pub async fn run_ask(
    question: &str,
    collection: Option<String>,
    top_k: Option<usize>,
    min_relevance: Option<f32>,
    model: Option<String>,
    show_sources: bool,
    json: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let collection =
        collection.unwrap_or_else(|| settings.vector_store.default_collection.clone());
    let model = model.unwrap_or_else(|| settings.rag.model.clone());

    let orchestrator = Orchestrator::new(settings.clone())?;
    let llm = Arc::new(OpenAIChat::new(&model));
    let engine = RagEngine::new(orchestrator.index(&collection), llm, settings.rag.clone())
        .with_prompts(orchestrator.prompts().clone());

    let opts = AskOptions { top_k, min_relevance };

    let spinner = Output::spinner("Searching documents...");

    match engine.ask(question, &opts).await {
        Ok(answer) => {
            spinner.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
                return Ok(());
            }

            println!("\n{}\n", answer.answer);

            if !answer.citations.is_empty() {
                Output::header("Citations");
                for (i, citation) in answer.citations.iter().enumerate() {
                    Output::citation(i + 1, &citation.source, citation.page, citation.score);
                }

                if show_sources {
                    let ids: Vec<String> =
                        answer.citations.iter().map(|c| c.chunk_id.clone()).collect();
                    let texts = engine.index().fetch_texts(&ids).await.unwrap_or_default();

                    Output::header("Cited passages");
                    for citation in &answer.citations {
                        if let Some(text) = texts.get(&citation.chunk_id) {
                            Output::search_result(
                                &citation.source,
                                citation.page,
                                citation.score.unwrap_or(0.0),
                                text,
                            );
                        }
                    }
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
