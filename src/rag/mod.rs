//! RAG (Retrieval-Augmented Generation) for question answering with citations.
//!
//! Retrieves context blocks from the vector index, prompts the language
//! model, and aligns the `[n]` markers in the generated answer back to the
//! retrieved blocks.

pub mod citations;
pub mod context;
mod response;

pub use citations::{align_citations, markers_used};
pub use context::format_context_for_prompt;
pub use response::{is_summary_like, AskOptions, RagEngine};

use serde::{Deserialize, Serialize};

/// A citation resolved from a `[n]` marker in the generated answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Display name of the cited document.
    pub source: String,
    /// 1-based page number, if known.
    pub page: Option<u32>,
    /// Id of the cited chunk.
    pub chunk_id: String,
    /// Cosine distance of the cited block at retrieval time.
    pub score: Option<f32>,
}

/// The pipeline's terminal output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Markdown answer, possibly containing `[n]` citation markers.
    pub answer: String,
    /// Citations for the markers the model actually used, in order of
    /// first appearance. Empty when the model cited nothing.
    pub citations: Vec<Citation>,
    /// Reserved; only set (to 0.0) by the empty-context short-circuit.
    pub confidence: Option<f32>,
}
