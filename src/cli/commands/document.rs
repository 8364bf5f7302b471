//! Document command - register and process knowledge documents.

use crate::cli::commands::open_store;
use crate::cli::{DocumentAction, Output};
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::PodiumError;
use crate::ingest::IngestPipeline;
use crate::storage::{LocalStorage, ObjectStorage};
use crate::store::KnowledgeDocument;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Run a knowledge document action.
pub async fn run_document(action: &DocumentAction, settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings)?;
    let storage = Arc::new(LocalStorage::new(settings.storage_root())?);

    match action {
        DocumentAction::Add { file, user } => {
            let path = Path::new(file);
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    PodiumError::InvalidInput(format!("Not a file path: {}", file))
                })?
                .to_string();

            let bytes = std::fs::read(path)?;
            let file_path = format!("{}/{}", user, filename);

            storage.upload(&file_path, &bytes).await?;

            let document = KnowledgeDocument::new(user.clone(), filename, file_path);
            store.insert_document(&document).await?;

            Output::success(&format!("Registered \"{}\"", document.filename));
            Output::kv("Id", &document.id.to_string());
            Output::info(&format!(
                "Process it with: podium document process {} --user {}",
                document.id, user
            ));
        }

        DocumentAction::Process { id, user } => {
            let id = Uuid::parse_str(id)
                .map_err(|e| PodiumError::InvalidInput(format!("Invalid document id: {}", e)))?;

            let embedder = Arc::new(OpenAIEmbedder::with_config(
                &settings.embedding.model,
                settings.embedding.dimensions as usize,
            ));
            let pipeline = IngestPipeline::new(
                store,
                storage,
                embedder,
                settings.ingestion.max_chunk_chars,
            );

            let spinner = Output::spinner("Processing document...");
            let report = pipeline.process(id, user).await?;
            spinner.finish_and_clear();

            Output::success(&format!(
                "Processed document into {} chunks",
                report.chunks_processed
            ));
        }

        DocumentAction::List { user } => {
            let documents = store.list_documents(user).await?;

            if documents.is_empty() {
                Output::info(&format!("No documents for user {}", user));
                return Ok(());
            }

            Output::header("Knowledge Documents");
            for document in &documents {
                let status = if document.processed {
                    "processed"
                } else {
                    "pending"
                };
                Output::list_item(&format!(
                    "{} ({}) - {}",
                    document.filename, document.id, status
                ));
            }
        }
    }

    Ok(())
}
