//! SQLite-based vector store implementation.
//!
//! Embeddings are stored as little-endian f32 blobs and cosine similarity is
//! computed in Rust. The index lives in its own directory, which is deleted
//! and recreated every time a new document is indexed.

use super::{cosine_similarity, rank, IndexEntry, SearchResult, VectorStore};
use crate::chunking::{DocumentChunk, SourceMetadata};
use crate::error::{QuizError, Result};
use crate::ingestion::SourceKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// File name of the database inside the index directory.
pub const DATABASE_FILE: &str = "vectors.db";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        page INTEGER,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        chunk_order INTEGER NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_order ON chunks(chunk_order);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    /// Index directory, `None` for in-memory databases.
    dir: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) the index stored in `dir`.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn open(dir: &Path) -> Result<Self> {
        let conn = Self::open_database(dir)?;
        info!("Opened SQLite vector store at {:?}", dir);

        Ok(Self {
            dir: Some(dir.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Self::open_empty()?;

        Ok(Self {
            dir: None,
            conn: Mutex::new(conn),
        })
    }

    /// Empty in-memory database with the index schema.
    fn open_empty() -> Result<Connection> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Delete the index directory and create a fresh database in it.
    fn recreate_database(dir: &Path) -> Result<Connection> {
        if dir.exists() {
            debug!("Removing previous index at {:?}", dir);
            std::fs::remove_dir_all(dir)?;
        }
        Self::open_database(dir)
    }

    fn open_database(dir: &Path) -> Result<Connection> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join(DATABASE_FILE))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| QuizError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
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

    fn insert_all(conn: &Connection, entries: &[IndexEntry]) -> Result<()> {
        let tx = conn.unchecked_transaction()?;

        for entry in entries {
            tx.execute(
                r#"
                INSERT INTO chunks
                (id, source_id, kind, page, content, embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    entry.id.to_string(),
                    entry.chunk.metadata.source_id,
                    entry.chunk.metadata.kind.to_string(),
                    entry.chunk.metadata.page,
                    entry.chunk.text,
                    Self::embedding_to_bytes(&entry.embedding),
                    entry.chunk_order,
                    entry.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn replace_all(&self, entries: Vec<IndexEntry>) -> Result<usize> {
        let mut conn = self.lock()?;

        match &self.dir {
            Some(dir) => {
                // Close the current database before its directory goes away.
                // The placeholder keeps the schema so the store stays usable
                // (and empty) if the rebuild fails.
                drop(std::mem::replace(&mut *conn, Self::open_empty()?));

                match Self::recreate_database(dir) {
                    Ok(fresh) => *conn = fresh,
                    Err(e) => {
                        warn!("Failed to recreate index at {:?}: {}", dir, e);
                        if let Ok(existing) = Self::open_database(dir) {
                            *conn = existing;
                        }
                        return Err(e);
                    }
                }
            }
            None => {
                conn.execute("DELETE FROM chunks", [])?;
            }
        }

        Self::insert_all(&conn, &entries)?;
        info!("Indexed {} chunks", entries.len());
        Ok(entries.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source_id, kind, page, content, embedding, chunk_order, indexed_at
            FROM chunks
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let kind_str: String = row.get(2)?;
            let embedding_bytes: Vec<u8> = row.get(5)?;
            let indexed_at_str: String = row.get(7)?;

            Ok(IndexEntry {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                chunk: DocumentChunk::new(
                    row.get(4)?,
                    SourceMetadata {
                        source_id: row.get(1)?,
                        kind: kind_str.parse().unwrap_or(SourceKind::Text),
                        page: row.get(3)?,
                    },
                ),
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                chunk_order: row.get(6)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            match row {
                Ok(entry) => {
                    let score = cosine_similarity(query_embedding, &entry.embedding);
                    if score >= min_score {
                        results.push(SearchResult { entry, score });
                    }
                }
                Err(e) => warn!("Skipping unreadable index row: {}", e),
            }
        }

        let results = rank(results, limit);
        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::test_support::entry;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .replace_all(vec![
                entry("Enzymes lower activation energy.", Some(3), vec![1.0, 0.0, 0.0], 0),
                entry("Unrelated passage.", None, vec![0.0, 1.0, 0.0], 1),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 10, 0.2).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);

        let meta = &results[0].entry.chunk.metadata;
        assert_eq!(meta.source_id, "course.pdf");
        assert_eq!(meta.kind, SourceKind::Pdf);
        assert_eq!(meta.page, Some(3));
    }

    #[tokio::test]
    async fn test_replace_all_recreates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("index");

        let store = SqliteVectorStore::open(&dir).unwrap();
        store
            .replace_all(vec![
                entry("first", Some(1), vec![1.0, 0.0], 0),
                entry("second", Some(2), vec![0.0, 1.0], 1),
            ])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let stray = dir.join("leftover.bin");
        std::fs::write(&stray, b"stale").unwrap();

        store
            .replace_all(vec![entry("third", None, vec![1.0, 1.0], 0)])
            .await
            .unwrap();

        assert!(!stray.exists());
        assert_eq!(store.count().await.unwrap(), 1);
        drop(store);

        let reopened = SqliteVectorStore::open(&dir).unwrap();
        let results = reopened.search(&[1.0, 1.0], 5, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.chunk.text, "third");
        assert_eq!(results[0].entry.chunk.metadata.page, None);
    }

    #[tokio::test]
    async fn test_failed_rebuild_leaves_store_usable() {
        let tmp = tempfile::tempdir().unwrap();
        let parent = tmp.path().join("data");
        let dir = parent.join("index");

        let store = SqliteVectorStore::open(&dir).unwrap();
        store
            .replace_all(vec![entry("first", Some(1), vec![1.0, 0.0], 0)])
            .await
            .unwrap();

        // With a plain file in place of its parent, the directory cannot be recreated.
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, b"not a directory").unwrap();

        let result = store
            .replace_all(vec![entry("second", Some(2), vec![0.0, 1.0], 0)])
            .await;
        assert!(result.is_err());

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.search(&[1.0, 0.0], 5, 0.0).await.unwrap().is_empty());
    }

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let embedding = vec![0.25f32, -1.5, 3.0];
        let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(SqliteVectorStore::bytes_to_embedding(&bytes), embedding);
    }
}
