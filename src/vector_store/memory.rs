//! In-memory vector storage.
//!
//! Useful for testing and small indexes.

use super::{cosine_distance, IndexRecord, RetrievedBlock, SourceSummary, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<String, IndexRecord>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn reset_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        // Removing an absent collection is a no-op, keeping reset idempotent
        collections.remove(collection);
        Ok(())
    }

    async fn add(&self, collection: &str, records: &[IndexRecord]) -> Result<usize> {
        let mut collections = self.collections.write().unwrap();
        let entries = collections.entry(collection.to_string()).or_default();
        for record in records {
            entries.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn nearest(
        &self,
        collection: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<RetrievedBlock>> {
        let collections = self.collections.read().unwrap();
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<RetrievedBlock> = entries
            .values()
            .map(|record| RetrievedBlock {
                id: record.id.clone(),
                text: record.text.clone(),
                source: record.source.clone(),
                page: record.page,
                score: cosine_distance(query_embedding, &record.embedding),
            })
            .collect();

        results.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(n_results);

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().unwrap();
        Ok(collections.get(collection).map_or(0, |c| c.len()))
    }

    async fn get_texts(&self, collection: &str, ids: &[String]) -> Result<HashMap<String, String>> {
        let collections = self.collections.read().unwrap();
        let Some(entries) = collections.get(collection) else {
            return Ok(HashMap::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| entries.get(id).map(|r| (id.clone(), r.text.clone())))
            .collect())
    }

    async fn list_sources(&self, collection: &str) -> Result<Vec<SourceSummary>> {
        let collections = self.collections.read().unwrap();
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut summaries: HashMap<String, SourceSummary> = HashMap::new();
        for record in entries.values() {
            let entry = summaries
                .entry(record.source.clone())
                .or_insert_with(|| SourceSummary {
                    source: record.source.clone(),
                    chunk_count: 0,
                    max_page: None,
                    indexed_at: record.indexed_at,
                });

            entry.chunk_count += 1;
            if record.page > entry.max_page {
                entry.max_page = record.page;
            }
            if record.indexed_at > entry.indexed_at {
                entry.indexed_at = record.indexed_at;
            }
        }

        let mut result: Vec<SourceSummary> = summaries.into_values().collect();
        result.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(result)
    }
}
