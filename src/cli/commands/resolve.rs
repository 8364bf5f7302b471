//! Resolve command - one-shot command resolution from the terminal.

use crate::cli::commands::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::resolver::{create_strategy, CommandResolver};

/// Resolve a single command against the content library.
pub async fn run_resolve(
    command: &str,
    presentation_id: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    let store = open_store(&settings)?;
    let resolver = CommandResolver::new(store, create_strategy(&settings));

    let spinner = Output::spinner("Resolving command...");
    let outcome = resolver
        .handle(command, presentation_id.as_deref())
        .await?;
    spinner.finish_and_clear();

    println!("{}", outcome.ai_response);
    println!();
    Output::kv("Suggestion", &outcome.suggestion);

    match &outcome.selected_content {
        Some(item) => {
            println!();
            Output::success("Selected content:");
            Output::kv("Title", &item.title);
            Output::kv("Description", &item.description);
            Output::kv("Video", &item.video_url);
        }
        None => {
            println!();
            Output::info("No content selected.");
        }
    }

    Ok(())
}
