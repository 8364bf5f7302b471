//! Content store abstraction for Podium.
//!
//! Provides a trait-based interface over the relational backends that hold
//! the content library, presentations, interaction history, knowledge
//! documents and fine-tune prompts.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A video content item shown during a presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique content ID.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Longer description of the content.
    pub description: String,
    /// URL of the video to show.
    pub video_url: String,
    /// Keyword tags, insertion order preserved. May be empty.
    pub keywords: Vec<String>,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create a new content item.
    pub fn new(title: String, description: String, video_url: String, keywords: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            video_url,
            keywords,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A presentation session, created once per viewer-page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Unique presentation ID.
    pub id: Uuid,
    /// Presentation title.
    pub title: String,
    /// Name of the presenter, if given.
    pub presenter_name: Option<String>,
    /// Free-form status string (e.g. "active").
    pub status: String,
    /// Content currently on screen, if any.
    pub current_content_id: Option<Uuid>,
    /// Owning user. Anonymous sessions are never persisted at all.
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    /// Create a new active presentation.
    pub fn new(title: String, presenter_name: Option<String>, user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            presenter_name,
            status: "active".to_string(),
            current_content_id: None,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Append-only log entry pairing a command with the AI's response and any
/// content shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Presentation this command belongs to. Not enforced as a reference:
    /// anonymous sessions carry locally generated ids that are never stored.
    pub presentation_id: String,
    /// The raw command text.
    pub command_text: String,
    /// The response the resolver produced.
    pub ai_response: String,
    /// The content item shown, if any. May dangle after content deletion.
    pub content_displayed: Option<Uuid>,
    /// When the command was handled.
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Create a new history record stamped with the current time.
    pub fn new(
        presentation_id: String,
        command_text: String,
        ai_response: String,
        content_displayed: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            presentation_id,
            command_text,
            ai_response,
            content_displayed,
            timestamp: Utc::now(),
        }
    }
}

/// An uploaded knowledge document and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Unique document ID.
    pub id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Original filename.
    pub filename: String,
    /// Path in object storage.
    pub file_path: String,
    /// Extracted text, set once processing succeeds.
    pub content_text: Option<String>,
    /// Document embedding, set once processing succeeds.
    pub embedding: Option<Vec<f32>>,
    /// Whether ingestion has completed.
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeDocument {
    /// Create a new unprocessed document record.
    pub fn new(user_id: String, filename: String, file_path: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            filename,
            file_path,
            content_text: None,
            embedding: None,
            processed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored fine-tune prompt. At most one active prompt per user; saving a
/// new one deactivates the older ones. Nothing reads these back yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTunePrompt {
    pub id: Uuid,
    pub user_id: String,
    pub prompt_text: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trait for content store implementations.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List the full content library in stored order.
    async fn list_content(&self) -> Result<Vec<ContentItem>>;

    /// Fetch a single content item. `None` when the id is unknown.
    async fn get_content(&self, id: Uuid) -> Result<Option<ContentItem>>;

    /// Insert a new content item.
    async fn insert_content(&self, item: &ContentItem) -> Result<()>;

    /// Update an existing content item. Returns false when the id is unknown.
    async fn update_content(&self, item: &ContentItem) -> Result<bool>;

    /// Delete a content item. Returns false when the id is unknown.
    async fn delete_content(&self, id: Uuid) -> Result<bool>;

    /// Insert a presentation session.
    async fn insert_presentation(&self, presentation: &Presentation) -> Result<()>;

    /// Fetch a presentation session.
    async fn get_presentation(&self, id: Uuid) -> Result<Option<Presentation>>;

    /// Record which content a presentation is currently showing.
    async fn set_current_content(&self, id: Uuid, content_id: Option<Uuid>) -> Result<bool>;

    /// Append an interaction record. Records are never mutated or deleted.
    async fn append_history(&self, record: &HistoryRecord) -> Result<()>;

    /// List history for a presentation, oldest first.
    async fn history_for(&self, presentation_id: &str) -> Result<Vec<HistoryRecord>>;

    /// Insert a knowledge document record.
    async fn insert_document(&self, document: &KnowledgeDocument) -> Result<()>;

    /// Fetch a document scoped to its owner. A foreign or unknown id both
    /// come back as `None`.
    async fn get_document(&self, id: Uuid, user_id: &str) -> Result<Option<KnowledgeDocument>>;

    /// List a user's documents, newest first.
    async fn list_documents(&self, user_id: &str) -> Result<Vec<KnowledgeDocument>>;

    /// Persist ingestion results: extracted text, optional embedding, and
    /// the processed flag.
    async fn mark_processed(
        &self,
        id: Uuid,
        content_text: &str,
        embedding: Option<&[f32]>,
    ) -> Result<()>;

    /// Save a fine-tune prompt, deactivating the user's older prompts.
    async fn save_prompt(&self, user_id: &str, prompt_text: &str) -> Result<FineTunePrompt>;
}
