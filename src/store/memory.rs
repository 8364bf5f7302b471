//! In-memory content store implementation.
//!
//! Useful for testing and ephemeral runs.

use super::{
    ContentItem, ContentStore, FineTunePrompt, HistoryRecord, KnowledgeDocument, Presentation,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory content store.
#[derive(Default)]
pub struct MemoryStore {
    content: RwLock<Vec<ContentItem>>,
    presentations: RwLock<Vec<Presentation>>,
    history: RwLock<Vec<HistoryRecord>>,
    documents: RwLock<Vec<KnowledgeDocument>>,
    prompts: RwLock<Vec<FineTunePrompt>>,
}

impl MemoryStore {
    /// Create a new in-memory content store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_content(&self) -> Result<Vec<ContentItem>> {
        Ok(self.content.read().unwrap().clone())
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<ContentItem>> {
        let content = self.content.read().unwrap();
        Ok(content.iter().find(|i| i.id == id).cloned())
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<()> {
        self.content.write().unwrap().push(item.clone());
        Ok(())
    }

    async fn update_content(&self, item: &ContentItem) -> Result<bool> {
        let mut content = self.content.write().unwrap();
        match content.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_content(&self, id: Uuid) -> Result<bool> {
        let mut content = self.content.write().unwrap();
        let initial_len = content.len();
        content.retain(|i| i.id != id);
        Ok(content.len() < initial_len)
    }

    async fn insert_presentation(&self, presentation: &Presentation) -> Result<()> {
        self.presentations
            .write()
            .unwrap()
            .push(presentation.clone());
        Ok(())
    }

    async fn get_presentation(&self, id: Uuid) -> Result<Option<Presentation>> {
        let presentations = self.presentations.read().unwrap();
        Ok(presentations.iter().find(|p| p.id == id).cloned())
    }

    async fn set_current_content(&self, id: Uuid, content_id: Option<Uuid>) -> Result<bool> {
        let mut presentations = self.presentations.write().unwrap();
        match presentations.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.current_content_id = content_id;
                p.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_history(&self, record: &HistoryRecord) -> Result<()> {
        self.history.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn history_for(&self, presentation_id: &str) -> Result<Vec<HistoryRecord>> {
        let history = self.history.read().unwrap();
        Ok(history
            .iter()
            .filter(|r| r.presentation_id == presentation_id)
            .cloned()
            .collect())
    }

    async fn insert_document(&self, document: &KnowledgeDocument) -> Result<()> {
        self.documents.write().unwrap().push(document.clone());
        Ok(())
    }

    async fn get_document(&self, id: Uuid, user_id: &str) -> Result<Option<KnowledgeDocument>> {
        let documents = self.documents.read().unwrap();
        Ok(documents
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<KnowledgeDocument>> {
        let documents = self.documents.read().unwrap();
        let mut result: Vec<KnowledgeDocument> = documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn mark_processed(
        &self,
        id: Uuid,
        content_text: &str,
        embedding: Option<&[f32]>,
    ) -> Result<()> {
        let mut documents = self.documents.write().unwrap();
        match documents.iter_mut().find(|d| d.id == id) {
            Some(d) => {
                d.content_text = Some(content_text.to_string());
                d.embedding = embedding.map(|e| e.to_vec());
                d.processed = true;
                d.updated_at = Utc::now();
                Ok(())
            }
            None => Err(crate::error::PodiumError::Store(format!(
                "Failed to update document {}",
                id
            ))),
        }
    }

    async fn save_prompt(&self, user_id: &str, prompt_text: &str) -> Result<FineTunePrompt> {
        let mut prompts = self.prompts.write().unwrap();
        let now = Utc::now();

        for prompt in prompts.iter_mut().filter(|p| p.user_id == user_id) {
            prompt.is_active = false;
            prompt.updated_at = now;
        }

        let prompt = FineTunePrompt {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            prompt_text: prompt_text.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        prompts.push(prompt.clone());
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_content() {
        let store = MemoryStore::new();

        let item = ContentItem::new(
            "Network Overview".to_string(),
            "How the network fits together".to_string(),
            "https://example.com/network.mp4".to_string(),
            vec!["network".to_string()],
        );
        store.insert_content(&item).await.unwrap();

        assert_eq!(store.list_content().await.unwrap().len(), 1);
        assert!(store.get_content(item.id).await.unwrap().is_some());

        let mut renamed = item.clone();
        renamed.title = "Network Deep Dive".to_string();
        assert!(store.update_content(&renamed).await.unwrap());
        assert_eq!(
            store.get_content(item.id).await.unwrap().unwrap().title,
            "Network Deep Dive"
        );

        assert!(store.delete_content(item.id).await.unwrap());
        assert!(store.list_content().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_prompts_single_active() {
        let store = MemoryStore::new();

        store.save_prompt("u1", "first").await.unwrap();
        store.save_prompt("u1", "second").await.unwrap();
        store.save_prompt("u2", "other user").await.unwrap();

        let prompts = store.prompts.read().unwrap();
        let active_u1: Vec<_> = prompts
            .iter()
            .filter(|p| p.user_id == "u1" && p.is_active)
            .collect();
        assert_eq!(active_u1.len(), 1);
        assert_eq!(active_u1[0].prompt_text, "second");
    }
}
