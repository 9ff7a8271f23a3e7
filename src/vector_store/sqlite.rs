//! SQLite-based vector storage.
//!
//! Uses SQLite with cosine distance computed in Rust for simplicity.
//! For production use cases with large indexes, consider the sqlite-vec
//! extension or a dedicated vector database.

use super::{cosine_distance, IndexRecord, RetrievedBlock, SourceSummary, VectorStore};
use crate::error::{LeseError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        source TEXT NOT NULL,
        page INTEGER,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
    CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(collection, source);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self))]
    async fn reset_collection(&self, collection: &str) -> Result<()> {
        let conn = self.lock()?;

        // DELETE on an empty or unknown collection affects zero rows,
        // which keeps reset idempotent.
        let deleted = conn.execute(
            "DELETE FROM chunks WHERE collection = ?1",
            params![collection],
        )?;

        info!("Reset collection '{}' ({} records removed)", collection, deleted);
        Ok(())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn add(&self, collection: &str, records: &[IndexRecord]) -> Result<usize> {
        let conn = self.lock()?;

        let tx = conn.unchecked_transaction()?;

        for record in records {
            let embedding_bytes = Self::embedding_to_bytes(&record.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, collection, source, page, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    record.id,
                    collection,
                    record.source,
                    record.page,
                    record.text,
                    embedding_bytes,
                    record.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Added {} records to collection '{}'", records.len(), collection);
        Ok(records.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn nearest(
        &self,
        collection: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<RetrievedBlock>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, source, page, content, embedding FROM chunks WHERE collection = ?1",
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<u32>>(2)?,
                row.get::<_, String>(3)?,
                Self::bytes_to_embedding(&embedding_bytes),
            ))
        })?;

        let mut results: Vec<RetrievedBlock> = rows
            .filter_map(|r| r.ok())
            .map(|(id, source, page, text, embedding)| {
                let score = cosine_distance(query_embedding, &embedding);
                RetrievedBlock {
                    id,
                    text,
                    source,
                    page,
                    score,
                }
            })
            .collect();

        // Sort by distance ascending (lower = more relevant)
        results.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(n_results);

        debug!("Found {} nearest records", results.len());
        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_texts(&self, collection: &str, ids: &[String]) -> Result<HashMap<String, String>> {
        let conn = self.lock()?;

        let mut found = HashMap::new();
        for id in ids {
            let row = conn.query_row(
                "SELECT content FROM chunks WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get::<_, String>(0),
            );
            match row {
                Ok(text) => {
                    found.insert(id.clone(), text);
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self, collection: &str) -> Result<Vec<SourceSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source, COUNT(*) as chunk_count, MAX(page) as max_page,
                   MAX(indexed_at) as indexed_at
            FROM chunks
            WHERE collection = ?1
            GROUP BY source
            ORDER BY indexed_at DESC
            "#,
        )?;

        let sources = stmt.query_map(params![collection], |row| {
            let indexed_at_str: String = row.get(3)?;
            Ok(SourceSummary {
                source: row.get(0)?,
                chunk_count: row.get(1)?,
                max_page: row.get(2)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<SourceSummary> = sources.filter_map(|s| s.ok()).collect();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::ChunkRecord;

    fn record(text: &str, source: &str, page: Option<u32>, embedding: Vec<f32>) -> IndexRecord {
        IndexRecord::new(
            ChunkRecord::new(text.to_string(), source.to_string(), page),
            embedding,
        )
    }

    #[tokio::test]
    async fn test_add_and_nearest() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let records = vec![
            record("first chunk", "doc.pdf", Some(1), vec![1.0, 0.0, 0.0]),
            record("second chunk", "doc.pdf", Some(2), vec![0.0, 1.0, 0.0]),
        ];
        store.add("test", &records).await.unwrap();

        let results = store.nearest("test", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "first chunk");
        assert!(results[0].score < 0.001);
        assert!(results[1].score > results[0].score);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .add("a", &[record("in a", "doc.pdf", Some(1), vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .add("b", &[record("in b", "doc.pdf", Some(1), vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.count("a").await.unwrap(), 1);
        store.reset_collection("a").await.unwrap();
        assert_eq!(store.count("a").await.unwrap(), 0);
        assert_eq!(store.count("b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .add("test", &[record("chunk", "doc.pdf", Some(1), vec![1.0])])
            .await
            .unwrap();

        store.reset_collection("test").await.unwrap();
        assert_eq!(store.count("test").await.unwrap(), 0);

        // Second reset finds nothing to delete and still succeeds
        store.reset_collection("test").await.unwrap();
        assert_eq!(store.count("test").await.unwrap(), 0);

        // As does resetting a collection that never existed
        store.reset_collection("never_created").await.unwrap();
    }

    #[tokio::test]
    async fn test_count_missing_collection_is_zero() {
        let store = SqliteVectorStore::in_memory().unwrap();
        assert_eq!(store.count("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_texts_omits_missing_ids() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let rec = record("some text", "doc.pdf", Some(1), vec![1.0]);
        let id = rec.id.clone();
        store.add("test", &[rec]).await.unwrap();

        let texts = store
            .get_texts("test", &[id.clone(), "no-such-id".to_string()])
            .await
            .unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts.get(&id).map(String::as_str), Some("some text"));
    }

    #[tokio::test]
    async fn test_list_sources() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .add(
                "test",
                &[
                    record("a", "one.pdf", Some(1), vec![1.0]),
                    record("b", "one.pdf", Some(3), vec![1.0]),
                    record("c", "two.pdf", Some(2), vec![1.0]),
                ],
            )
            .await
            .unwrap();

        let mut sources = store.list_sources("test").await.unwrap();
        sources.sort_by(|a, b| a.source.cmp(&b.source));
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source, "one.pdf");
        assert_eq!(sources[0].chunk_count, 2);
        assert_eq!(sources[0].max_page, Some(3));
    }

    #[tokio::test]
    async fn test_embedding_round_trip() {
        let embedding = vec![0.25f32, -1.5, 3.75];
        let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
        assert_eq!(SqliteVectorStore::bytes_to_embedding(&bytes), embedding);
    }

    #[tokio::test]
    async fn test_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        let store = SqliteVectorStore::new(&path).unwrap();
        store
            .add("test", &[record("persisted", "doc.pdf", Some(1), vec![1.0])])
            .await
            .unwrap();
        assert_eq!(store.count("test").await.unwrap(), 1);
    }
}
