//! Content command - manage the content library.

use crate::cli::commands::open_store;
use crate::cli::{ContentAction, Output};
use crate::config::Settings;
use crate::error::PodiumError;
use crate::store::ContentItem;
use uuid::Uuid;

/// Run a content library action.
pub async fn run_content(action: &ContentAction, settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings)?;

    match action {
        ContentAction::Add {
            title,
            description,
            url,
            keyword,
        } => {
            // Catch obviously broken URLs before they reach the library
            url::Url::parse(url)
                .map_err(|e| PodiumError::InvalidInput(format!("Invalid video URL: {}", e)))?;

            let item = ContentItem::new(
                title.clone(),
                description.clone(),
                url.clone(),
                keyword.clone(),
            );
            store.insert_content(&item).await?;

            Output::success(&format!("Added \"{}\"", item.title));
            Output::kv("Id", &item.id.to_string());
        }

        ContentAction::List => {
            let items = store.list_content().await?;

            if items.is_empty() {
                Output::info("The content library is empty.");
                return Ok(());
            }

            Output::header("Content Library");
            for item in &items {
                Output::content_info(&item.title, &item.id.to_string(), &item.keywords);
            }
            println!();
            Output::kv("Total", &items.len().to_string());
        }

        ContentAction::Rm { id } => {
            let id = Uuid::parse_str(id)
                .map_err(|e| PodiumError::InvalidInput(format!("Invalid content id: {}", e)))?;

            if store.delete_content(id).await? {
                Output::success(&format!("Removed content {}", id));
            } else {
                Output::warning(&format!("No content with id {}", id));
            }
        }
    }

    Ok(())
}
