//! Retrieval-augmented question answering over the knowledge base.

use std::sync::Arc;

use crate::db::models;
use crate::db::KnowledgeStore;
use crate::embeddings::Embedder;
use crate::errors::AppError;
use crate::llm::{build_rag_prompt, ChatModel, QA_SYSTEM_PROMPT};

/// Deterministic fallback when retrieval finds nothing; returned without a
/// model call.
pub const NO_CONTEXT_ANSWER: &str = "No relevant information found in uploaded documents.";

pub struct RagService {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
}

impl RagService {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            store,
            embedder,
            chat,
        }
    }

    /// k nearest chunks for `query`, nearest first. An empty query embeds
    /// to nothing and returns an empty result set rather than failing.
    pub async fn semantic_search(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<(models::KnowledgeChunk, f64)>, AppError> {
        let embedding = self.embedder.embed_query(query).await?;
        if embedding.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.store.search_similar_chunks(&embedding, limit).await?)
    }

    /// Answer `query` from the knowledge base.
    pub async fn answer(&self, query: &str, limit: u64) -> Result<String, AppError> {
        let hits = self.semantic_search(query, limit).await?;
        metrics::counter!("noavoice_rag_queries_total").increment(1);
        synthesize_answer(self.chat.as_ref(), query, &hits).await
    }
}

/// Assemble retrieved chunk text into a context block and ask the model to
/// answer strictly from it. Zero chunks short-circuits to the fixed
/// fallback, saving the model call.
pub async fn synthesize_answer(
    chat: &dyn ChatModel,
    query: &str,
    hits: &[(models::KnowledgeChunk, f64)],
) -> Result<String, AppError> {
    if hits.is_empty() {
        return Ok(NO_CONTEXT_ANSWER.to_string());
    }

    let context = hits
        .iter()
        .map(|(chunk, _)| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = build_rag_prompt(query, &context);
    chat.complete(QA_SYSTEM_PROMPT, &prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::db::testing::InMemoryStore;
    use crate::embeddings::MockEmbedder;
    use crate::llm::MockChatModel;

    struct CountingChat {
        calls: AtomicUsize,
        answer: String,
    }

    #[async_trait]
    impl ChatModel for CountingChat {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(user.contains("Context:"));
            Ok(self.answer.clone())
        }
    }

    fn chunk(content: &str) -> (models::KnowledgeChunk, f64) {
        (
            models::KnowledgeChunk {
                id: uuid::Uuid::new_v4(),
                file_name: Some("doc.txt".to_string()),
                file_type: Some("txt".to_string()),
                content: content.to_string(),
                chunk_index: 0,
                embedding: None,
                created_at: chrono::Utc::now().into(),
            },
            0.1,
        )
    }

    #[tokio::test]
    async fn empty_retrieval_returns_fixed_answer_without_model_call() {
        let chat = CountingChat {
            calls: AtomicUsize::new(0),
            answer: "should not be used".to_string(),
        };

        let answer = synthesize_answer(&chat, "anything", &[]).await.unwrap();
        assert_eq!(answer, NO_CONTEXT_ANSWER);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retrieved_chunks_are_passed_as_context() {
        let chat = CountingChat {
            calls: AtomicUsize::new(0),
            answer: "Opening hours are 9-5.".to_string(),
        };

        let hits = vec![chunk("We open at 9am."), chunk("We close at 5pm.")];
        let answer = synthesize_answer(&chat, "When are you open?", &hits)
            .await
            .unwrap();

        assert_eq!(answer, "Opening hours are 9-5.");
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn search_excludes_unembedded_chunks_and_orders_ties_by_id() {
        let store = Arc::new(InMemoryStore::default());
        let embedder = Arc::new(MockEmbedder::new(8));
        let query_vec = embedder.embed_query("opening hours").await.unwrap();

        // Two rows equidistant from the query and one with no embedding
        let a = store.insert_row("first", Some(query_vec.clone()));
        let b = store.insert_row("second", Some(query_vec));
        store.insert_row("unembedded", None);

        let svc = RagService::new(store, embedder, Arc::new(MockChatModel::default()));

        let hits = svc.semantic_search("opening hours", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|(c, _)| c.content != "unembedded"));

        let ids: Vec<uuid::Uuid> = hits.iter().map(|(c, _)| c.id).collect();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);

        // Idempotent for an unchanged corpus and identical query
        let again = svc.semantic_search("opening hours", 10).await.unwrap();
        let ids_again: Vec<uuid::Uuid> = again.iter().map(|(c, _)| c.id).collect();
        assert_eq!(ids, ids_again);
    }

    #[tokio::test]
    async fn empty_query_searches_nothing() {
        let store = Arc::new(InMemoryStore::default());
        store.insert_row("present", Some(vec![0.0; 8]));

        let svc = RagService::new(
            store,
            Arc::new(MockEmbedder::new(8)),
            Arc::new(MockChatModel::default()),
        );

        let hits = svc.semantic_search("", 5).await.unwrap();
        assert!(hits.is_empty());
    }
}
