//! Embedding generation for semantic indexing and retrieval.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// Providers distinguish embedding intent: `embed_documents` is used at
/// ingestion time, `embed_query` at retrieval time. Implementations must
/// propagate provider errors (auth, quota) rather than degrade silently.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of document chunks, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
