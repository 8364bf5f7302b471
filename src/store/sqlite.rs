//! SQLite-based content store implementation.
//!
//! Single-file database with WAL enabled. Keywords are stored as a JSON
//! array column to preserve insertion order; embeddings are stored as
//! little-endian f32 BLOBs.

use super::{
    ContentItem, ContentStore, FineTunePrompt, HistoryRecord, KnowledgeDocument, Presentation,
};
use crate::error::{PodiumError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS content_library (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    video_url TEXT NOT NULL,
    keywords TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS presentations (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    presenter_name TEXT,
    status TEXT NOT NULL,
    current_content_id TEXT,
    user_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS presentation_history (
    id TEXT PRIMARY KEY,
    presentation_id TEXT NOT NULL,
    command_text TEXT NOT NULL,
    ai_response TEXT NOT NULL,
    content_displayed TEXT,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_presentation_id
    ON presentation_history(presentation_id);

CREATE TABLE IF NOT EXISTS knowledge_documents (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    filename TEXT NOT NULL,
    file_path TEXT NOT NULL,
    content_text TEXT,
    embedding BLOB,
    processed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_user_id
    ON knowledge_documents(user_id);

CREATE TABLE IF NOT EXISTS ai_prompts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    prompt_text TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQLite-based content store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite content store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite content store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite content store (useful for testing).
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
            .map_err(|e| PodiumError::Store(format!("Failed to acquire lock: {}", e)))
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

    fn parse_timestamp(value: String) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn content_from_row(row: &Row<'_>) -> rusqlite::Result<ContentItem> {
        let id_str: String = row.get(0)?;
        let keywords_json: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;

        Ok(ContentItem {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            title: row.get(1)?,
            description: row.get(2)?,
            video_url: row.get(3)?,
            keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
            created_at: Self::parse_timestamp(created_at),
            updated_at: Self::parse_timestamp(updated_at),
        })
    }

    fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
        let id_str: String = row.get(0)?;
        let content_displayed: Option<String> = row.get(4)?;
        let timestamp: String = row.get(5)?;

        Ok(HistoryRecord {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            presentation_id: row.get(1)?,
            command_text: row.get(2)?,
            ai_response: row.get(3)?,
            content_displayed: content_displayed.and_then(|s| Uuid::parse_str(&s).ok()),
            timestamp: Self::parse_timestamp(timestamp),
        })
    }

    fn document_from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeDocument> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Option<Vec<u8>> = row.get(5)?;
        let processed: i64 = row.get(6)?;
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;

        Ok(KnowledgeDocument {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            user_id: row.get(1)?,
            filename: row.get(2)?,
            file_path: row.get(3)?,
            content_text: row.get(4)?,
            embedding: embedding_bytes.map(|b| Self::bytes_to_embedding(&b)),
            processed: processed != 0,
            created_at: Self::parse_timestamp(created_at),
            updated_at: Self::parse_timestamp(updated_at),
        })
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    #[instrument(skip(self))]
    async fn list_content(&self) -> Result<Vec<ContentItem>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, description, video_url, keywords, created_at, updated_at
            FROM content_library
            ORDER BY created_at
            "#,
        )?;

        let items = stmt.query_map([], Self::content_from_row)?;
        let result: Vec<ContentItem> = items.filter_map(|i| i.ok()).collect();

        debug!("Listed {} content items", result.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_content(&self, id: Uuid) -> Result<Option<ContentItem>> {
        let conn = self.lock()?;

        let item = conn.query_row(
            r#"
            SELECT id, title, description, video_url, keywords, created_at, updated_at
            FROM content_library
            WHERE id = ?1
            "#,
            params![id.to_string()],
            Self::content_from_row,
        );

        match item {
            Ok(i) => Ok(Some(i)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, item))]
    async fn insert_content(&self, item: &ContentItem) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO content_library
            (id, title, description, video_url, keywords, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                item.id.to_string(),
                item.title,
                item.description,
                item.video_url,
                serde_json::to_string(&item.keywords)?,
                item.created_at.to_rfc3339(),
                item.updated_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted content item {}", item.id);
        Ok(())
    }

    #[instrument(skip(self, item))]
    async fn update_content(&self, item: &ContentItem) -> Result<bool> {
        let conn = self.lock()?;

        let changed = conn.execute(
            r#"
            UPDATE content_library
            SET title = ?2, description = ?3, video_url = ?4, keywords = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
            params![
                item.id.to_string(),
                item.title,
                item.description,
                item.video_url,
                serde_json::to_string(&item.keywords)?,
                item.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(changed > 0)
    }

    #[instrument(skip(self))]
    async fn delete_content(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM content_library WHERE id = ?1",
            params![id.to_string()],
        )?;

        info!("Deleted {} content items for id {}", deleted, id);
        Ok(deleted > 0)
    }

    #[instrument(skip(self, presentation))]
    async fn insert_presentation(&self, presentation: &Presentation) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO presentations
            (id, title, presenter_name, status, current_content_id, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                presentation.id.to_string(),
                presentation.title,
                presentation.presenter_name,
                presentation.status,
                presentation.current_content_id.map(|c| c.to_string()),
                presentation.user_id,
                presentation.created_at.to_rfc3339(),
                presentation.updated_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted presentation {}", presentation.id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_presentation(&self, id: Uuid) -> Result<Option<Presentation>> {
        let conn = self.lock()?;

        let presentation = conn.query_row(
            r#"
            SELECT id, title, presenter_name, status, current_content_id, user_id,
                   created_at, updated_at
            FROM presentations
            WHERE id = ?1
            "#,
            params![id.to_string()],
            |row| {
                let id_str: String = row.get(0)?;
                let current_content: Option<String> = row.get(4)?;
                let created_at: String = row.get(6)?;
                let updated_at: String = row.get(7)?;

                Ok(Presentation {
                    id: Uuid::parse_str(&id_str).unwrap_or_default(),
                    title: row.get(1)?,
                    presenter_name: row.get(2)?,
                    status: row.get(3)?,
                    current_content_id: current_content.and_then(|s| Uuid::parse_str(&s).ok()),
                    user_id: row.get(5)?,
                    created_at: Self::parse_timestamp(created_at),
                    updated_at: Self::parse_timestamp(updated_at),
                })
            },
        );

        match presentation {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn set_current_content(&self, id: Uuid, content_id: Option<Uuid>) -> Result<bool> {
        let conn = self.lock()?;

        let changed = conn.execute(
            "UPDATE presentations SET current_content_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                id.to_string(),
                content_id.map(|c| c.to_string()),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(changed > 0)
    }

    #[instrument(skip(self, record))]
    async fn append_history(&self, record: &HistoryRecord) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO presentation_history
            (id, presentation_id, command_text, ai_response, content_displayed, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id.to_string(),
                record.presentation_id,
                record.command_text,
                record.ai_response,
                record.content_displayed.map(|c| c.to_string()),
                record.timestamp.to_rfc3339(),
            ],
        )?;

        debug!("Appended history record for {}", record.presentation_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn history_for(&self, presentation_id: &str) -> Result<Vec<HistoryRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, presentation_id, command_text, ai_response, content_displayed, timestamp
            FROM presentation_history
            WHERE presentation_id = ?1
            ORDER BY timestamp
            "#,
        )?;

        let records = stmt.query_map(params![presentation_id], Self::history_from_row)?;
        let result: Vec<HistoryRecord> = records.filter_map(|r| r.ok()).collect();

        debug!(
            "Found {} history records for {}",
            result.len(),
            presentation_id
        );
        Ok(result)
    }

    #[instrument(skip(self, document))]
    async fn insert_document(&self, document: &KnowledgeDocument) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO knowledge_documents
            (id, user_id, filename, file_path, content_text, embedding, processed,
             created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                document.id.to_string(),
                document.user_id,
                document.filename,
                document.file_path,
                document.content_text,
                document.embedding.as_deref().map(Self::embedding_to_bytes),
                document.processed as i64,
                document.created_at.to_rfc3339(),
                document.updated_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted document {}", document.id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_document(&self, id: Uuid, user_id: &str) -> Result<Option<KnowledgeDocument>> {
        let conn = self.lock()?;

        let document = conn.query_row(
            r#"
            SELECT id, user_id, filename, file_path, content_text, embedding, processed,
                   created_at, updated_at
            FROM knowledge_documents
            WHERE id = ?1 AND user_id = ?2
            "#,
            params![id.to_string(), user_id],
            Self::document_from_row,
        );

        match document {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_documents(&self, user_id: &str) -> Result<Vec<KnowledgeDocument>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, filename, file_path, content_text, embedding, processed,
                   created_at, updated_at
            FROM knowledge_documents
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let documents = stmt.query_map(params![user_id], Self::document_from_row)?;
        Ok(documents.filter_map(|d| d.ok()).collect())
    }

    #[instrument(skip(self, content_text, embedding))]
    async fn mark_processed(
        &self,
        id: Uuid,
        content_text: &str,
        embedding: Option<&[f32]>,
    ) -> Result<()> {
        let conn = self.lock()?;

        let changed = conn.execute(
            r#"
            UPDATE knowledge_documents
            SET content_text = ?2, embedding = ?3, processed = 1, updated_at = ?4
            WHERE id = ?1
            "#,
            params![
                id.to_string(),
                content_text,
                embedding.map(Self::embedding_to_bytes),
                Utc::now().to_rfc3339(),
            ],
        )?;

        if changed == 0 {
            return Err(PodiumError::Store(format!(
                "Failed to update document {}",
                id
            )));
        }

        info!("Marked document {} as processed", id);
        Ok(())
    }

    #[instrument(skip(self, prompt_text))]
    async fn save_prompt(&self, user_id: &str, prompt_text: &str) -> Result<FineTunePrompt> {
        let conn = self.lock()?;
        let now = Utc::now();

        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "UPDATE ai_prompts SET is_active = 0, updated_at = ?2 WHERE user_id = ?1 AND is_active = 1",
            params![user_id, now.to_rfc3339()],
        )?;

        let prompt = FineTunePrompt {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            prompt_text: prompt_text.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        tx.execute(
            r#"
            INSERT INTO ai_prompts (id, user_id, prompt_text, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?5)
            "#,
            params![
                prompt.id.to_string(),
                prompt.user_id,
                prompt.prompt_text,
                prompt.created_at.to_rfc3339(),
                prompt.updated_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;

        info!("Saved active prompt for user {}", user_id);
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_content_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();

        let item = ContentItem::new(
            "Business Expansion Strategy".to_string(),
            "Growth plans for the next quarter".to_string(),
            "https://example.com/expansion.mp4".to_string(),
            vec!["expansion".to_string(), "growth".to_string()],
        );

        store.insert_content(&item).await.unwrap();

        let listed = store.list_content().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Business Expansion Strategy");
        assert_eq!(listed[0].keywords, vec!["expansion", "growth"]);

        let fetched = store.get_content(item.id).await.unwrap().unwrap();
        assert_eq!(fetched.video_url, "https://example.com/expansion.mp4");

        assert!(store.delete_content(item.id).await.unwrap());
        assert!(store.get_content(item.id).await.unwrap().is_none());
        assert!(!store.delete_content(item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_history_append_and_list() {
        let store = SqliteStore::in_memory().unwrap();

        let record = HistoryRecord::new(
            "p1".to_string(),
            "show the intro".to_string(),
            "Here is the intro".to_string(),
            None,
        );
        store.append_history(&record).await.unwrap();

        // A record pointing at deleted content still reads back
        let dangling = HistoryRecord::new(
            "p1".to_string(),
            "show it again".to_string(),
            "Gone now".to_string(),
            Some(Uuid::new_v4()),
        );
        store.append_history(&dangling).await.unwrap();

        let records = store.history_for("p1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].command_text, "show the intro");
        assert!(records[1].content_displayed.is_some());

        assert!(store.history_for("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_document_owner_scoping() {
        let store = SqliteStore::in_memory().unwrap();

        let doc = KnowledgeDocument::new(
            "user-a".to_string(),
            "notes.txt".to_string(),
            "user-a/notes.txt".to_string(),
        );
        store.insert_document(&doc).await.unwrap();

        // Owner sees it; another user gets the same miss as a bad id
        assert!(store.get_document(doc.id, "user-a").await.unwrap().is_some());
        assert!(store.get_document(doc.id, "user-b").await.unwrap().is_none());
        assert!(store
            .get_document(Uuid::new_v4(), "user-a")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_mark_processed_persists_embedding() {
        let store = SqliteStore::in_memory().unwrap();

        let doc = KnowledgeDocument::new(
            "user-a".to_string(),
            "notes.txt".to_string(),
            "user-a/notes.txt".to_string(),
        );
        store.insert_document(&doc).await.unwrap();

        store
            .mark_processed(doc.id, "hello world", Some(&[0.5, -1.0, 2.0]))
            .await
            .unwrap();

        let updated = store.get_document(doc.id, "user-a").await.unwrap().unwrap();
        assert!(updated.processed);
        assert_eq!(updated.content_text.as_deref(), Some("hello world"));
        assert_eq!(updated.embedding.unwrap(), vec![0.5, -1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_save_prompt_deactivates_older() {
        let store = SqliteStore::in_memory().unwrap();

        let first = store.save_prompt("user-a", "be formal").await.unwrap();
        let second = store.save_prompt("user-a", "be casual").await.unwrap();
        assert!(first.is_active);
        assert!(second.is_active);

        let conn = store.conn.lock().unwrap();
        let active: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ai_prompts WHERE user_id = 'user-a' AND is_active = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(active, 1);
    }
}
