//! Vector index and storage backends.
//!
//! Storage engines implement the [`VectorStore`] trait; [`VectorIndex`]
//! layers embedding, relevance filtering, and page diversification on top.

mod index;
mod memory;
mod sqlite;

pub use index::{QueryOptions, VectorIndex};
pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A chunk of document text prepared for indexing, before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique chunk ID, generated at ingestion time.
    pub id: String,
    /// Trimmed, non-empty chunk text.
    pub text: String,
    /// Display name of the originating document.
    pub source: String,
    /// 1-based page number, if known.
    pub page: Option<u32>,
}

impl ChunkRecord {
    /// Create a new chunk record with a fresh ID.
    pub fn new(text: String, source: String, page: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            source,
            page,
        }
    }
}

/// A chunk as stored by the index: record plus its embedding.
///
/// The embedding is computed once, at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl IndexRecord {
    /// Pair a chunk with its embedding.
    pub fn new(chunk: ChunkRecord, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id,
            text: chunk.text,
            source: chunk.source,
            page: chunk.page,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A retrieval hit: the stored chunk plus its distance to the query.
///
/// `score` is cosine distance — lower is better, 0 means identical.
#[derive(Debug, Clone)]
pub struct RetrievedBlock {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
    pub score: f32,
}

/// Summary information about an indexed source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Document display name.
    pub source: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// Highest page number seen for this source.
    pub max_page: Option<u32>,
    /// When the source was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector storage engines.
///
/// Engines store records scoped by named collection and rank by cosine
/// distance. `count` and `get_texts` are advisory reads: a collection or id
/// that does not exist degrades to zero/omitted rather than an error, while
/// real storage failures still propagate.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Delete all records in the named collection. Idempotent: resetting a
    /// collection that does not exist is not an error.
    async fn reset_collection(&self, collection: &str) -> Result<()>;

    /// Write records (with precomputed embeddings) to the collection.
    async fn add(&self, collection: &str, records: &[IndexRecord]) -> Result<usize>;

    /// The `n_results` nearest records by cosine distance, ascending.
    async fn nearest(
        &self,
        collection: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<RetrievedBlock>>;

    /// Current record count; 0 if the collection cannot be read.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Chunk texts by id. Ids not present are silently omitted.
    async fn get_texts(&self, collection: &str, ids: &[String]) -> Result<HashMap<String, String>>;

    /// Per-source summaries for the collection.
    async fn list_sources(&self, collection: &str) -> Result<Vec<SourceSummary>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance: 0 for identical direction, up to 2 for opposite.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_distance() {
        let a = vec![1.0, 0.0];
        assert!(cosine_distance(&a, &[1.0, 0.0]).abs() < 0.001);
        assert!((cosine_distance(&a, &[0.0, 1.0]) - 1.0).abs() < 0.001);
        assert!((cosine_distance(&a, &[-1.0, 0.0]) - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_chunk_record_ids_unique() {
        let a = ChunkRecord::new("text".into(), "doc.pdf".into(), Some(1));
        let b = ChunkRecord::new("text".into(), "doc.pdf".into(), Some(1));
        assert_ne!(a.id, b.id);
    }
}
