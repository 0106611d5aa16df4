//! In-memory `KnowledgeStore` for service tests that need a working chunk
//! store without a database. Search mirrors the SQL contract: NULL
//! embeddings are excluded, ordering is L2 distance then id.

use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::DbErr;
use uuid::Uuid;

use super::models;
use super::repository::{KnowledgeStats, KnowledgeStore, NewChunk};

#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<(models::KnowledgeChunk, Option<Vec<f32>>)>>,
}

impl InMemoryStore {
    /// Seed one row directly, bypassing the ingestion pipeline.
    pub fn insert_row(&self, content: &str, embedding: Option<Vec<f32>>) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push((
            models::KnowledgeChunk {
                id,
                file_name: Some("seed.txt".to_string()),
                file_type: Some("txt".to_string()),
                content: content.to_string(),
                chunk_index: 0,
                embedding: None,
                created_at: chrono::Utc::now().into(),
            },
            embedding,
        ));
        id
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    async fn create_chunks(
        &self,
        chunks: Vec<NewChunk>,
    ) -> Result<models::KnowledgeChunk, DbErr> {
        if chunks.is_empty() {
            return Err(DbErr::Custom("empty chunk batch".to_string()));
        }

        let created_at: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
        let mut rows = self.rows.lock().unwrap();
        let mut first = None;

        for chunk in chunks {
            let model = models::KnowledgeChunk {
                id: Uuid::new_v4(),
                file_name: chunk.file_name,
                file_type: chunk.file_type,
                content: chunk.content,
                chunk_index: chunk.chunk_index,
                embedding: None,
                created_at,
            };
            if first.is_none() {
                first = Some(model.clone());
            }
            rows.push((model, chunk.embedding));
        }

        Ok(first.unwrap())
    }

    async fn get_all_knowledge(&self) -> Result<Vec<models::KnowledgeChunk>, DbErr> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect())
    }

    async fn delete_knowledge(&self, id: Uuid) -> Result<bool, DbErr> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(model, _)| model.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_all_knowledge(&self) -> Result<u64, DbErr> {
        let mut rows = self.rows.lock().unwrap();
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }

    async fn knowledge_stats(&self) -> Result<KnowledgeStats, DbErr> {
        let rows = self.rows.lock().unwrap();
        let total = rows.len() as i64;
        let processed = rows.iter().filter(|(_, e)| e.is_some()).count() as i64;
        let bytes: i64 = rows.iter().map(|(m, _)| m.content.len() as i64).sum();
        Ok(KnowledgeStats {
            total_documents: total,
            processed,
            pending: total - processed,
            storage_mb: bytes as f64 / (1024.0 * 1024.0),
        })
    }

    async fn search_similar_chunks(
        &self,
        query_embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<(models::KnowledgeChunk, f64)>, DbErr> {
        let rows = self.rows.lock().unwrap();
        let mut hits: Vec<(models::KnowledgeChunk, f64)> = rows
            .iter()
            .filter_map(|(model, embedding)| {
                let embedding = embedding.as_ref()?;
                let distance = embedding
                    .iter()
                    .zip(query_embedding)
                    .map(|(a, b)| (a - b) as f64 * (a - b) as f64)
                    .sum::<f64>()
                    .sqrt();
                Some((model.clone(), distance))
            })
            .collect();

        hits.sort_by(|(a, da), (b, db)| {
            da.partial_cmp(db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(limit as usize);
        Ok(hits)
    }
}
