//! Pipeline orchestrator for Lese.
//!
//! Wires the configured components together and coordinates ingestion:
//! document -> pages -> chunks -> embeddings -> vector index.

use crate::chunking::{create_chunker, ChunkingConfig, ChunkingStrategy};
use crate::config::{Prompts, Settings};
use crate::document::{display_name, source_for_path};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LeseError, Result};
use crate::vector_store::{ChunkRecord, MemoryVectorStore, SqliteVectorStore, VectorIndex, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Lese pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "memory" => Arc::new(MemoryVectorStore::new()),
            _ => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
        };

        Ok(Self {
            settings,
            prompts,
            embedder,
            store,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            store,
        }
    }

    /// Get a vector index over the named collection.
    pub fn index(&self, collection: &str) -> VectorIndex {
        VectorIndex::new(self.store.clone(), self.embedder.clone(), collection)
    }

    /// Get the prompts.
    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ingest documents: extract pages, chunk, embed, and index.
    ///
    /// Returns the number of chunks written. A return of 0 means no page
    /// produced any text (e.g. scanned, image-only PDFs) and nothing was
    /// written — a signal for the caller, not an error.
    #[instrument(skip(self, paths), fields(collection = %collection, documents = paths.len()))]
    pub async fn ingest(
        &self,
        paths: &[PathBuf],
        collection: &str,
        reset_collection: bool,
    ) -> Result<usize> {
        // Fail fast on missing inputs, before any embedding cost
        for path in paths {
            if !path.exists() {
                return Err(LeseError::DocumentNotFound(path.display().to_string()));
            }
        }

        let index = self.index(collection);
        if reset_collection {
            info!("Resetting collection '{}'", collection);
            index.reset().await?;
        }

        let strategy: ChunkingStrategy = self
            .settings
            .chunking
            .strategy
            .parse()
            .unwrap_or(ChunkingStrategy::Sentence);
        let chunker = create_chunker(strategy)?;
        let config = ChunkingConfig {
            target_size: self.settings.chunking.chunk_size,
            overlap: self.settings.chunking.chunk_overlap,
        };

        let mut records: Vec<ChunkRecord> = Vec::new();
        for path in paths {
            records.extend(self.chunk_document(path, chunker.as_ref(), &config).await?);
        }

        if records.is_empty() {
            info!("No text chunks produced; nothing written");
            return Ok(0);
        }

        info!("Indexing {} chunks into '{}'", records.len(), collection);
        index.add_chunks(records).await
    }

    /// Extract one document and turn its pages into chunk records.
    async fn chunk_document(
        &self,
        path: &Path,
        chunker: &dyn crate::chunking::Chunker,
        config: &ChunkingConfig,
    ) -> Result<Vec<ChunkRecord>> {
        let source = display_name(path);
        let extractor = source_for_path(path);
        let pages = extractor.extract(path).await?;

        info!("Extracted {} pages from {}", pages.len(), source);

        let mut records = Vec::new();
        for page in &pages {
            if page.text.trim().is_empty() {
                // Likely a scanned page; skipped, not an error
                continue;
            }
            for chunk in chunker.chunk(&page.text, config)? {
                let text = chunk.trim();
                if text.is_empty() {
                    continue;
                }
                records.push(ChunkRecord::new(
                    text.to_string(),
                    source.clone(),
                    Some(page.number),
                ));
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;

    /// Deterministic embedder for pipeline tests.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StubEmbedder),
            Arc::new(MemoryVectorStore::new()),
        )
    }

    fn three_page_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(
            file,
            "The first page talks about salmon.\u{c}\
             The second page talks about herring.\u{c}\
             The third page talks about mackerel."
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_ingest_counts_and_round_trip() {
        let orch = orchestrator();
        let file = three_page_file();
        let paths = vec![file.path().to_path_buf()];

        let written = orch.ingest(&paths, "test", false).await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(orch.index("test").count().await.unwrap(), 3);

        // Reset empties the collection
        orch.index("test").reset().await.unwrap();
        assert_eq!(orch.index("test").count().await.unwrap(), 0);

        // Re-ingesting writes the same number of chunks again
        let rewritten = orch.ingest(&paths, "test", false).await.unwrap();
        assert_eq!(rewritten, written);
        assert_eq!(orch.index("test").count().await.unwrap(), written);
    }

    #[tokio::test]
    async fn test_ingest_records_carry_page_metadata() {
        let orch = orchestrator();
        let file = three_page_file();

        orch.ingest(&[file.path().to_path_buf()], "test", false)
            .await
            .unwrap();

        let blocks = orch
            .index("test")
            .query(
                "salmon",
                &crate::vector_store::QueryOptions {
                    k: 10,
                    min_relevance: None,
                    diversify: false,
                    per_page_cap: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(blocks.len(), 3);
        let mut pages: Vec<Option<u32>> = blocks.iter().map(|b| b.page).collect();
        pages.sort();
        assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
        assert!(blocks.iter().all(|b| !b.text.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_ingest_missing_document_fails_fast() {
        let orch = orchestrator();
        let err = orch
            .ingest(&[PathBuf::from("/no/such/file.pdf")], "test", false)
            .await
            .unwrap_err();
        assert!(matches!(err, LeseError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_ingest_empty_pages_yield_zero_without_write() {
        let orch = orchestrator();
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        // Form feeds only: every page is blank, like a scanned PDF
        write!(file, "\u{c}\u{c}").unwrap();

        let written = orch
            .ingest(&[file.path().to_path_buf()], "test", false)
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(orch.index("test").count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ingest_with_reset_replaces_collection() {
        let orch = orchestrator();
        let file = three_page_file();
        let paths = vec![file.path().to_path_buf()];

        orch.ingest(&paths, "test", false).await.unwrap();
        orch.ingest(&paths, "test", true).await.unwrap();

        // Reset wiped the first batch, so only one batch remains
        assert_eq!(orch.index("test").count().await.unwrap(), 3);
    }
}
