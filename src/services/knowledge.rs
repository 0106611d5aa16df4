//! Knowledge ingestion service.
//!
//! The upload pipeline: parse the file, chunk the text, embed every chunk,
//! store the batch. Embedding happens before any row is written and the
//! batch goes in under a single transaction, so a provider failure partway
//! through leaves the store untouched.

use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::db::models;
use crate::db::{KnowledgeStats, KnowledgeStore, NewChunk};
use crate::embeddings::Embedder;
use crate::errors::AppError;
use crate::ingestion::chunker::{self, ChunkingConfig};
use crate::ingestion::parser::{self, FileType};

/// Result of one document upload.
#[derive(Debug)]
pub struct IngestOutcome {
    /// First created chunk, returned to the caller as a representative
    /// handle for the upload.
    pub representative: models::KnowledgeChunk,
    pub chunk_count: usize,
}

pub struct KnowledgeService {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
}

impl KnowledgeService {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn Embedder>,
        chunk_size: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            chunking: ChunkingConfig { chunk_size },
        }
    }

    /// Ingest one uploaded document into the global knowledge base.
    pub async fn ingest_document(
        &self,
        file_name: &str,
        data: &[u8],
    ) -> Result<IngestOutcome, AppError> {
        let start = Instant::now();

        // Extension gate happens before any parsing
        let file_type = FileType::from_filename(file_name)?;
        let text = parser::extract_text(file_type, data)?;

        let chunks = chunker::split_text(&text, &self.chunking);
        if chunks.is_empty() {
            return Err(AppError::Validation(
                "Document contains no extractable text".to_string(),
            ));
        }
        let chunk_count = chunks.len();

        // Embed everything up front; the first provider failure aborts the
        // whole upload with nothing persisted.
        let embedding_start = Instant::now();
        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(contents).await?;
        let embedding_duration = embedding_start.elapsed();

        let new_chunks: Vec<NewChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| NewChunk {
                file_name: Some(file_name.to_string()),
                file_type: Some(file_type.as_str().to_string()),
                content: chunk.content,
                chunk_index: chunk.index,
                embedding: Some(embedding),
            })
            .collect();

        let representative = self.store.create_chunks(new_chunks).await?;

        let total_duration = start.elapsed();
        metrics::counter!("noavoice_ingest_documents_total").increment(1);
        metrics::counter!("noavoice_ingest_chunks_total").increment(chunk_count as u64);
        metrics::histogram!("noavoice_ingest_duration_seconds")
            .record(total_duration.as_secs_f64());
        metrics::histogram!("noavoice_embedding_duration_seconds")
            .record(embedding_duration.as_secs_f64());

        tracing::info!(
            file_name,
            file_type = file_type.as_str(),
            chunks = chunk_count,
            embedding_ms = embedding_duration.as_millis(),
            total_ms = total_duration.as_millis(),
            "Document ingested"
        );

        Ok(IngestOutcome {
            representative,
            chunk_count,
        })
    }

    pub async fn list(&self) -> Result<Vec<models::KnowledgeChunk>, AppError> {
        Ok(self.store.get_all_knowledge().await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_knowledge(id).await? {
            return Err(AppError::not_found("Knowledge", id));
        }
        Ok(())
    }

    /// Irreversible global reset; the route gates this behind authentication.
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_all_knowledge().await?;
        tracing::info!(removed, "Knowledge base reset");
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<KnowledgeStats, AppError> {
        Ok(self.store.knowledge_stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::db::testing::InMemoryStore;
    use crate::embeddings::MockEmbedder;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            Err(AppError::EmbeddingProvider("quota exceeded".to_string()))
        }

        async fn embed_documents(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
            Err(AppError::EmbeddingProvider("quota exceeded".to_string()))
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    fn service(store: Arc<InMemoryStore>, embedder: Arc<dyn Embedder>) -> KnowledgeService {
        KnowledgeService::new(store, embedder, 64)
    }

    #[tokio::test]
    async fn small_txt_upload_round_trips_through_the_store() {
        let store = Arc::new(InMemoryStore::default());
        let svc = service(store.clone(), Arc::new(MockEmbedder::new(8)));

        let outcome = svc
            .ingest_document("notes.txt", b"one\n\ntwo\n\nthree")
            .await
            .unwrap();
        assert_eq!(outcome.chunk_count, 1);

        let listed = svc.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "one\n\ntwo\n\nthree");
        assert_eq!(listed[0].file_name.as_deref(), Some("notes.txt"));
        assert_eq!(listed[0].file_type.as_deref(), Some("txt"));
        assert_eq!(listed[0].id, outcome.representative.id);
    }

    #[tokio::test]
    async fn embedding_failure_persists_nothing() {
        let store = Arc::new(InMemoryStore::default());
        let svc = service(store.clone(), Arc::new(FailingEmbedder));

        let err = svc
            .ingest_document("notes.txt", b"a document long enough to chunk twice over the configured size bound for this test")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmbeddingProvider(_)));
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn delete_reports_not_found_and_removes_exactly_one_row() {
        let store = Arc::new(InMemoryStore::default());
        let kept = store.insert_row("kept", None);
        let target = store.insert_row("target", None);
        let svc = service(store.clone(), Arc::new(MockEmbedder::new(8)));

        let err = svc.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        svc.delete(target).await.unwrap();
        let remaining = svc.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept);
    }

    #[tokio::test]
    async fn delete_all_empties_the_store() {
        let store = Arc::new(InMemoryStore::default());
        for i in 0..5 {
            store.insert_row(&format!("chunk {i}"), Some(vec![0.0; 8]));
        }
        let svc = service(store.clone(), Arc::new(MockEmbedder::new(8)));

        assert_eq!(svc.delete_all().await.unwrap(), 5);
        assert!(svc.list().await.unwrap().is_empty());
        assert_eq!(store.row_count(), 0);
    }
}
