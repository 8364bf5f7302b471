//! Keyword-matching fallback resolution.
//!
//! Used when no model credential is configured. Performs a case-insensitive
//! substring match of the command against each item's title, description
//! and keywords, in stored library order.

use super::{ResolveStrategy, Resolution};
use crate::error::Result;
use crate::store::ContentItem;
use async_trait::async_trait;
use tracing::debug;

const MATCH_SUGGESTION: &str =
    "คลิกเพื่อดูเนื้อหานี้ หรือลองค้นหาเนื้อหาอื่นที่เกี่ยวข้อง";
const NO_MATCH_SUGGESTION: &str =
    "ลองใช้คำศัพท์เช่น 'crown diamond', 'network', 'security', 'business', 'training'";

/// Keyword-matching fallback strategy.
#[derive(Default)]
pub struct KeywordStrategy;

impl KeywordStrategy {
    /// Create a new keyword strategy.
    pub fn new() -> Self {
        Self
    }

    /// Check whether a command matches an item.
    ///
    /// Keywords match in either direction: a keyword contained in the
    /// command, or the whole command contained in a keyword.
    fn matches(command_lower: &str, item: &ContentItem) -> bool {
        if item.title.to_lowercase().contains(command_lower)
            || item.description.to_lowercase().contains(command_lower)
        {
            return true;
        }

        item.keywords.iter().any(|keyword| {
            let keyword_lower = keyword.to_lowercase();
            keyword_lower.contains(command_lower) || command_lower.contains(&keyword_lower)
        })
    }
}

#[async_trait]
impl ResolveStrategy for KeywordStrategy {
    async fn resolve(&self, command: &str, library: &[ContentItem]) -> Result<Resolution> {
        let command_lower = command.to_lowercase();
        let matched = library
            .iter()
            .find(|item| Self::matches(&command_lower, item));

        debug!(
            "Keyword fallback {} a match for command",
            if matched.is_some() { "found" } else { "did not find" }
        );

        Ok(match matched {
            Some(item) => Resolution {
                selected_content_id: Some(item.id),
                response: format!(
                    "พบเนื้อหาที่เหมาะสม: {} - {}",
                    item.title, item.description
                ),
                suggestion: MATCH_SUGGESTION.to_string(),
            },
            None => Resolution {
                selected_content_id: None,
                response: format!(
                    "ไม่พบเนื้อหาที่ตรงกับคำสั่ง \"{}\" กรุณาลองใช้คำค้นหาอื่น",
                    command
                ),
                suggestion: NO_MATCH_SUGGESTION.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Vec<ContentItem> {
        vec![
            ContentItem::new(
                "Business Expansion Strategy".to_string(),
                "Growth plans for the coming year".to_string(),
                "https://example.com/expansion.mp4".to_string(),
                vec!["expansion".to_string()],
            ),
            ContentItem::new(
                "Network Security Basics".to_string(),
                "Protecting the core network".to_string(),
                "https://example.com/security.mp4".to_string(),
                vec!["security".to_string(), "network".to_string()],
            ),
        ]
    }

    #[tokio::test]
    async fn test_exact_title_selects_item() {
        let library = library();
        let strategy = KeywordStrategy::new();

        let resolution = strategy
            .resolve("Business Expansion Strategy", &library)
            .await
            .unwrap();

        assert_eq!(resolution.selected_content_id, Some(library[0].id));
        assert!(resolution.response.contains("Business Expansion Strategy"));
    }

    #[tokio::test]
    async fn test_keyword_inside_longer_command() {
        let library = library();
        let strategy = KeywordStrategy::new();

        // "expansion" is a keyword contained in the command
        let resolution = strategy
            .resolve("please show the expansion video", &library)
            .await
            .unwrap();

        assert_eq!(resolution.selected_content_id, Some(library[0].id));
    }

    #[tokio::test]
    async fn test_command_inside_keyword() {
        let library = library();
        let strategy = KeywordStrategy::new();

        // "secur" is contained in the keyword "security"
        let resolution = strategy.resolve("secur", &library).await.unwrap();

        assert_eq!(resolution.selected_content_id, Some(library[1].id));
    }

    #[tokio::test]
    async fn test_first_match_in_stored_order_wins() {
        let mut library = library();
        library[0].keywords.push("network".to_string());
        let strategy = KeywordStrategy::new();

        let resolution = strategy.resolve("network", &library).await.unwrap();

        assert_eq!(resolution.selected_content_id, Some(library[0].id));
    }

    #[tokio::test]
    async fn test_empty_library_yields_no_match() {
        let strategy = KeywordStrategy::new();

        let resolution = strategy.resolve("anything", &[]).await.unwrap();

        assert!(resolution.selected_content_id.is_none());
        assert!(resolution.response.contains("ไม่พบเนื้อหาที่ตรงกับคำสั่ง"));
    }

    #[tokio::test]
    async fn test_no_match_returns_canned_suggestion() {
        let library = library();
        let strategy = KeywordStrategy::new();

        let resolution = strategy
            .resolve("completely unrelated topic", &library)
            .await
            .unwrap();

        assert!(resolution.selected_content_id.is_none());
        assert_eq!(resolution.suggestion, NO_MATCH_SUGGESTION);
        assert!(resolution
            .response
            .contains("\"completely unrelated topic\""));
    }
}
