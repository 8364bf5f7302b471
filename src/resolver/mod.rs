//! Command-to-content resolution.
//!
//! Maps a presenter's free-text command to a content library item, either
//! through a hosted language model or a keyword fallback. The strategy is
//! picked once at startup, based on whether a model credential is
//! configured, and injected into the resolver.

mod keyword;
mod model;

pub use keyword::KeywordStrategy;
pub use model::ModelStrategy;

use crate::config::Settings;
use crate::error::{PodiumError, Result};
use crate::store::{ContentItem, ContentStore, HistoryRecord};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Outcome of a resolution strategy: the chosen item (if any), a response
/// for the presenter and an extra suggestion.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Identifier of the selected content item, if one matched.
    pub selected_content_id: Option<Uuid>,
    /// Response text shown to the presenter.
    pub response: String,
    /// Additional presentation tip.
    pub suggestion: String,
}

/// Trait for command resolution strategies.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Resolve a command against the content library.
    async fn resolve(&self, command: &str, library: &[ContentItem]) -> Result<Resolution>;
}

/// Create a resolution strategy based on credential presence.
///
/// With a model credential configured the model-backed strategy is used;
/// otherwise commands fall back to keyword matching.
pub fn create_strategy(settings: &Settings) -> Box<dyn ResolveStrategy> {
    if crate::openai::has_api_key() {
        info!("Model credential found, using model-backed resolution");
        Box::new(ModelStrategy::new(settings))
    } else {
        info!("No model credential, falling back to keyword matching");
        Box::new(KeywordStrategy::new())
    }
}

/// Flatten the content library into one description line per item, handed
/// to the model as context.
pub(crate) fn describe_library(library: &[ContentItem]) -> String {
    library
        .iter()
        .map(|item| {
            format!(
                "ID: {}, Title: {}, Description: {}, Keywords: {}",
                item.id,
                item.title,
                item.description,
                item.keywords.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full result of handling one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    /// Response text for the presenter.
    pub ai_response: String,
    /// Additional presentation tip.
    pub suggestion: String,
    /// The selected content item, when the chosen id resolved.
    pub selected_content: Option<ContentItem>,
    /// The full content library at resolution time.
    pub content_library: Vec<ContentItem>,
}

/// Stateless handler turning one command into a [`CommandOutcome`].
pub struct CommandResolver {
    store: Arc<dyn ContentStore>,
    strategy: Box<dyn ResolveStrategy>,
}

impl CommandResolver {
    /// Create a resolver over a store with an injected strategy.
    pub fn new(store: Arc<dyn ContentStore>, strategy: Box<dyn ResolveStrategy>) -> Self {
        Self { store, strategy }
    }

    /// Handle one presenter command.
    ///
    /// Fetches the library, resolves the command, looks up the chosen item
    /// and appends a history record when a presentation id is supplied.
    /// Lookup misses and history failures are tolerated; everything else is
    /// fatal for the request.
    #[instrument(skip(self), fields(command = %command))]
    pub async fn handle(
        &self,
        command: &str,
        presentation_id: Option<&str>,
    ) -> Result<CommandOutcome> {
        let command = command.trim();
        if command.is_empty() {
            return Err(PodiumError::InvalidInput("Command is empty".to_string()));
        }

        let content_library = self.store.list_content().await?;
        let resolution = self.strategy.resolve(command, &content_library).await?;

        let selected_content = match resolution.selected_content_id {
            Some(id) => match self.store.get_content(id).await {
                Ok(item) => item,
                Err(e) => {
                    warn!("Content lookup for {} failed: {}", id, e);
                    None
                }
            },
            None => None,
        };

        if let Some(presentation_id) = presentation_id {
            let record = HistoryRecord::new(
                presentation_id.to_string(),
                command.to_string(),
                resolution.response.clone(),
                resolution.selected_content_id,
            );
            if let Err(e) = self.store.append_history(&record).await {
                warn!("History append for {} failed: {}", presentation_id, e);
            }
        }

        Ok(CommandOutcome {
            ai_response: resolution.response,
            suggestion: resolution.suggestion,
            selected_content,
            content_library,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// Strategy stub returning a fixed resolution.
    struct FixedStrategy(Resolution);

    #[async_trait]
    impl ResolveStrategy for FixedStrategy {
        async fn resolve(&self, _command: &str, _library: &[ContentItem]) -> Result<Resolution> {
            Ok(self.0.clone())
        }
    }

    fn expansion_item() -> ContentItem {
        ContentItem::new(
            "Business Expansion Strategy".to_string(),
            "Growth plans for the coming year".to_string(),
            "https://example.com/expansion.mp4".to_string(),
            vec!["expansion".to_string()],
        )
    }

    #[tokio::test]
    async fn test_command_resolves_and_records_history() {
        let store = Arc::new(MemoryStore::new());
        let item = expansion_item();
        store.insert_content(&item).await.unwrap();

        let resolver = CommandResolver::new(store.clone(), Box::new(KeywordStrategy::new()));
        let outcome = resolver
            .handle("แสดงวิดีโอเรื่อง Business Expansion", Some("p1"))
            .await
            .unwrap();

        assert_eq!(
            outcome.selected_content.as_ref().unwrap().title,
            "Business Expansion Strategy"
        );
        assert_eq!(outcome.content_library.len(), 1);

        let history = store.history_for("p1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].presentation_id, "p1");
        assert_eq!(history[0].command_text, "แสดงวิดีโอเรื่อง Business Expansion");
        assert_eq!(history[0].content_displayed, Some(item.id));
    }

    #[tokio::test]
    async fn test_anonymous_command_skips_history() {
        let store = Arc::new(MemoryStore::new());
        store.insert_content(&expansion_item()).await.unwrap();

        let resolver = CommandResolver::new(store.clone(), Box::new(KeywordStrategy::new()));
        resolver.handle("expansion", None).await.unwrap();

        assert!(store.history_for("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_selected_id_is_tolerated() {
        let store = Arc::new(MemoryStore::new());
        store.insert_content(&expansion_item()).await.unwrap();

        let strategy = FixedStrategy(Resolution {
            selected_content_id: Some(Uuid::new_v4()),
            response: "picked something stale".to_string(),
            suggestion: "try again".to_string(),
        });

        let resolver = CommandResolver::new(store, Box::new(strategy));
        let outcome = resolver.handle("whatever", Some("p1")).await.unwrap();

        // The miss degrades to no selection instead of failing the request
        assert!(outcome.selected_content.is_none());
        assert_eq!(outcome.ai_response, "picked something stale");
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let resolver = CommandResolver::new(store, Box::new(KeywordStrategy::new()));

        let err = resolver.handle("   ", None).await.unwrap_err();
        assert!(matches!(err, PodiumError::InvalidInput(_)));
    }

    #[test]
    fn test_describe_library_flattens_items() {
        let item = expansion_item();
        let description = describe_library(std::slice::from_ref(&item));

        assert!(description.contains(&item.id.to_string()));
        assert!(description.contains("Title: Business Expansion Strategy"));
        assert!(description.contains("Keywords: expansion"));
    }
}
