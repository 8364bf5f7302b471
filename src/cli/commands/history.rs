//! History command - show interaction history for a presentation.

use crate::cli::commands::open_store;
use crate::cli::Output;
use crate::config::Settings;

/// Show history for a presentation, oldest first.
pub async fn run_history(presentation_id: &str, settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings)?;
    let records = store.history_for(presentation_id).await?;

    if records.is_empty() {
        Output::info(&format!("No history for presentation {}", presentation_id));
        return Ok(());
    }

    Output::header(&format!("History for {}", presentation_id));
    for record in &records {
        Output::history_entry(
            &record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            &record.command_text,
            &record.ai_response,
        );
    }
    println!();
    Output::kv("Total", &records.len().to_string());

    Ok(())
}
