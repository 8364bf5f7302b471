//! Document ingestion pipeline.
//!
//! Downloads an uploaded document, extracts its text, splits it into
//! word-budget chunks, generates one embedding per chunk and persists the
//! first chunk's embedding together with the full extracted text.

use crate::chunking::split_into_chunks;
use crate::embedding::Embedder;
use crate::error::{PodiumError, Result};
use crate::storage::ObjectStorage;
use crate::store::ContentStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Result of processing one document.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Number of chunks the document text was split into.
    pub chunks_processed: usize,
}

/// Stateless ingestion pipeline over store, storage and embedder.
pub struct IngestPipeline {
    store: Arc<dyn ContentStore>,
    storage: Arc<dyn ObjectStorage>,
    embedder: Arc<dyn Embedder>,
    max_chunk_chars: usize,
}

impl IngestPipeline {
    /// Create a pipeline with the given collaborators.
    pub fn new(
        store: Arc<dyn ContentStore>,
        storage: Arc<dyn ObjectStorage>,
        embedder: Arc<dyn Embedder>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            store,
            storage,
            embedder,
            max_chunk_chars,
        }
    }

    /// Process a document on behalf of its owner.
    ///
    /// The document is loaded scoped to `user_id`, so a foreign document and
    /// an unknown id fail identically. Any embedding failure aborts before
    /// anything is persisted.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn process(&self, document_id: Uuid, user_id: &str) -> Result<IngestReport> {
        let document = self
            .store
            .get_document(document_id, user_id)
            .await?
            .ok_or(PodiumError::DocumentNotFound)?;

        let bytes = self.storage.download(&document.file_path).await?;

        // Plain-text decoding only; binary formats come out garbled
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let chunks = split_into_chunks(&text, self.max_chunk_chars);
        if chunks.is_empty() {
            warn!("Document {} has no extractable text", document_id);
            self.store.mark_processed(document.id, &text, None).await?;
            return Ok(IngestReport { chunks_processed: 0 });
        }

        let mut embeddings = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            embeddings.push(self.embedder.embed(chunk).await?);
        }

        // Only the first chunk's embedding is kept as the document embedding
        let document_embedding = embeddings.into_iter().next();

        self.store
            .mark_processed(document.id, &text, document_embedding.as_deref())
            .await?;

        info!(
            "Processed document {} into {} chunks",
            document_id,
            chunks.len()
        );

        Ok(IngestReport {
            chunks_processed: chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use crate::store::{KnowledgeDocument, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder stub returning a fixed vector per call, counting calls.
    struct StubEmbedder {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on: Some(call),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(PodiumError::Embedding("stubbed failure".to_string()));
            }
            Ok(vec![call as f32, 1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    async fn setup(
        text: &str,
    ) -> (Arc<MemoryStore>, Arc<LocalStorage>, KnowledgeDocument, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).unwrap());
        let store = Arc::new(MemoryStore::new());

        let document = KnowledgeDocument::new(
            "user-a".to_string(),
            "notes.txt".to_string(),
            "user-a/notes.txt".to_string(),
        );
        storage
            .upload(&document.file_path, text.as_bytes())
            .await
            .unwrap();
        store.insert_document(&document).await.unwrap();

        (store, storage, document, dir)
    }

    #[tokio::test]
    async fn test_process_persists_first_embedding_and_text() {
        let long_text = "word ".repeat(400); // splits into multiple chunks at 1000 chars
        let (store, storage, document, _dir) = setup(&long_text).await;

        let pipeline = IngestPipeline::new(
            store.clone(),
            storage,
            Arc::new(StubEmbedder::new()),
            1000,
        );
        let report = pipeline.process(document.id, "user-a").await.unwrap();

        assert!(report.chunks_processed > 1);

        let updated = store
            .get_document(document.id, "user-a")
            .await
            .unwrap()
            .unwrap();
        assert!(updated.processed);
        assert_eq!(updated.content_text.unwrap(), long_text);
        // First chunk's embedding, stamped with call index 0
        assert_eq!(updated.embedding.unwrap(), vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_foreign_document_and_unknown_id_fail_identically() {
        let (store, storage, document, _dir) = setup("some text").await;
        let pipeline = IngestPipeline::new(
            store,
            storage,
            Arc::new(StubEmbedder::new()),
            1000,
        );

        let foreign = pipeline.process(document.id, "user-b").await.unwrap_err();
        let unknown = pipeline.process(Uuid::new_v4(), "user-a").await.unwrap_err();

        assert!(matches!(foreign, PodiumError::DocumentNotFound));
        assert!(matches!(unknown, PodiumError::DocumentNotFound));
        assert_eq!(foreign.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_before_persistence() {
        let long_text = "word ".repeat(400);
        let (store, storage, document, _dir) = setup(&long_text).await;

        let pipeline = IngestPipeline::new(
            store.clone(),
            storage,
            Arc::new(StubEmbedder::failing_on(1)),
            1000,
        );

        let err = pipeline.process(document.id, "user-a").await.unwrap_err();
        assert!(matches!(err, PodiumError::Embedding(_)));

        let untouched = store
            .get_document(document.id, "user-a")
            .await
            .unwrap()
            .unwrap();
        assert!(!untouched.processed);
        assert!(untouched.content_text.is_none());
        assert!(untouched.embedding.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).unwrap());
        let store = Arc::new(MemoryStore::new());

        let document = KnowledgeDocument::new(
            "user-a".to_string(),
            "gone.txt".to_string(),
            "user-a/gone.txt".to_string(),
        );
        store.insert_document(&document).await.unwrap();

        let pipeline = IngestPipeline::new(
            store,
            storage,
            Arc::new(StubEmbedder::new()),
            1000,
        );
        let err = pipeline.process(document.id, "user-a").await.unwrap_err();
        assert!(matches!(err, PodiumError::Storage(_)));
    }

    #[tokio::test]
    async fn test_empty_document_reports_zero_chunks() {
        let (store, storage, document, _dir) = setup("").await;
        let pipeline = IngestPipeline::new(
            store.clone(),
            storage,
            Arc::new(StubEmbedder::new()),
            1000,
        );

        let report = pipeline.process(document.id, "user-a").await.unwrap();
        assert_eq!(report.chunks_processed, 0);

        let updated = store
            .get_document(document.id, "user-a")
            .await
            .unwrap()
            .unwrap();
        assert!(updated.processed);
        assert!(updated.embedding.is_none());
    }
}
