//! The query-side vector index.
//!
//! Pairs a storage engine with an embedder and a collection name, and owns
//! the retrieval policy: over-fetch, relevance filtering, and page
//! diversification.

use super::{ChunkRecord, IndexRecord, RetrievedBlock, SourceSummary, VectorStore};
use crate::embedding::Embedder;
use crate::error::{LeseError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Options for a retrieval query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Number of blocks to return.
    pub k: usize,
    /// Maximum cosine distance; results strictly above it are dropped.
    pub min_relevance: Option<f32>,
    /// Spread results across pages via round-robin selection.
    pub diversify: bool,
    /// Maximum results taken from one page when diversifying.
    pub per_page_cap: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            k: 5,
            min_relevance: None,
            diversify: true,
            per_page_cap: 2,
        }
    }
}

/// A named collection of embedded chunks with similarity search.
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl VectorIndex {
    /// Create an index over `collection` in the given store.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, collection: &str) -> Self {
        Self {
            store,
            embedder,
            collection: collection.to_string(),
        }
    }

    /// The collection this index reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Delete all records in the collection. Idempotent.
    pub async fn reset(&self) -> Result<()> {
        self.store.reset_collection(&self.collection).await
    }

    /// Current record count; 0 if the collection cannot be read.
    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.collection).await
    }

    /// Embed chunks in document mode and write them to the collection.
    ///
    /// A failed embedding call aborts the whole batch; nothing is written
    /// with missing or mismatched vectors.
    #[instrument(skip(self, chunks), fields(collection = %self.collection, count = chunks.len()))]
    pub async fn add_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(LeseError::Embedding(format!(
                "Embedding count mismatch: {} texts, {} vectors",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<IndexRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexRecord::new(chunk, embedding))
            .collect();

        self.store.add(&self.collection, &records).await
    }

    /// Retrieve the blocks most relevant to `text`.
    ///
    /// Over-fetches `max(4k, k)` neighbors to leave room for relevance
    /// filtering and diversification. With diversification on, results come
    /// back in page-round-robin selection order, not pure distance order.
    #[instrument(skip(self, text), fields(collection = %self.collection, k = opts.k))]
    pub async fn query(&self, text: &str, opts: &QueryOptions) -> Result<Vec<RetrievedBlock>> {
        let query_embedding = self.embedder.embed_query(text).await?;

        let n_results = (opts.k * 4).max(opts.k);
        let mut items = self
            .store
            .nearest(&self.collection, &query_embedding, n_results)
            .await?;

        if let Some(max_distance) = opts.min_relevance {
            items.retain(|r| r.score <= max_distance);
        }

        items.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));

        debug!("{} candidates after relevance filter", items.len());

        if opts.diversify && !items.is_empty() {
            Ok(diversify_by_page(items, opts.k, opts.per_page_cap))
        } else {
            items.truncate(opts.k);
            Ok(items)
        }
    }

    /// Chunk texts by id; missing ids are omitted from the map.
    pub async fn fetch_texts(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.store.get_texts(&self.collection, ids).await
    }

    /// Per-source summaries for the collection.
    pub async fn list_sources(&self) -> Result<Vec<SourceSummary>> {
        self.store.list_sources(&self.collection).await
    }
}

/// Page key that sorts numbered pages ascending and unknown pages last.
type PageKey = (bool, u32);

fn page_key(page: Option<u32>) -> PageKey {
    match page {
        Some(p) => (false, p),
        None => (true, 0),
    }
}

/// Round-robin selection across pages.
///
/// `items` must already be sorted ascending by distance. Each pass over the
/// page groups (ascending page order, unknown page last) takes the best
/// remaining item from every page that has not yet hit `per_page_cap`,
/// until `k` items are selected or a full pass makes no progress.
fn diversify_by_page(
    items: Vec<RetrievedBlock>,
    k: usize,
    per_page_cap: usize,
) -> Vec<RetrievedBlock> {
    use std::collections::{BTreeMap, VecDeque};

    let mut by_page: BTreeMap<PageKey, VecDeque<RetrievedBlock>> = BTreeMap::new();
    for item in items {
        by_page.entry(page_key(item.page)).or_default().push_back(item);
    }

    let mut taken: HashMap<PageKey, usize> = HashMap::new();
    let mut selected: Vec<RetrievedBlock> = Vec::new();

    while selected.len() < k {
        let mut progressed = false;
        for (key, bucket) in by_page.iter_mut() {
            if taken.get(key).copied().unwrap_or(0) >= per_page_cap {
                continue;
            }
            if let Some(item) = bucket.pop_front() {
                selected.push(item);
                *taken.entry(*key).or_insert(0) += 1;
                progressed = true;
                if selected.len() >= k {
                    break;
                }
            }
        }
        if !progressed {
            break;
        }
    }

    selected
}
