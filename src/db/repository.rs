use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use super::models::{self, assistant, booking, knowledge, user, BookingStatus};
use crate::config::DatabaseConfig;

/// Chunk storage operations the knowledge and retrieval services depend on.
/// `Repository` is the Postgres implementation; tests substitute an
/// in-memory store.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn create_chunks(&self, chunks: Vec<NewChunk>)
        -> Result<models::KnowledgeChunk, DbErr>;
    async fn get_all_knowledge(&self) -> Result<Vec<models::KnowledgeChunk>, DbErr>;
    async fn delete_knowledge(&self, id: Uuid) -> Result<bool, DbErr>;
    async fn delete_all_knowledge(&self) -> Result<u64, DbErr>;
    async fn knowledge_stats(&self) -> Result<KnowledgeStats, DbErr>;
    async fn search_similar_chunks(
        &self,
        query_embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<(models::KnowledgeChunk, f64)>, DbErr>;
}

#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

/// Chunk ready for insertion: content plus provenance and an optional
/// embedding of the configured dimension.
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub content: String,
    pub chunk_index: i32,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct NewAssistant {
    pub name: String,
    pub description: Option<String>,
    pub first_message: Option<String>,
    pub system_prompt: Option<String>,
    pub end_call_message: Option<String>,
    pub voice_name: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    pub voice_provider: String,
    pub language: String,
    pub timezone: Option<String>,
    pub detect_caller_number: bool,
    pub multilingual_support: bool,
    pub voice_recording: bool,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub calcom_booking_id: Option<i64>,
    pub calcom_booking_uid: Option<String>,
    pub attendee_name: String,
    pub attendee_email: String,
    pub attendee_phone: Option<String>,
    pub attendee_timezone: String,
    pub start_time: chrono::DateTime<chrono::FixedOffset>,
    pub end_time: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub event_type_id: i64,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct KnowledgeStats {
    pub total_documents: i64,
    pub processed: i64,
    pub pending: i64,
    pub storage_mb: f64,
}

#[derive(Debug, FromQueryResult)]
struct ChunkDistanceRow {
    id: Uuid,
    file_name: Option<String>,
    file_type: Option<String>,
    content: String,
    chunk_index: i32,
    created_at: chrono::DateTime<chrono::FixedOffset>,
    distance: f64,
}

#[derive(Debug, FromQueryResult)]
struct StatsRow {
    total: i64,
    processed: i64,
    bytes: Option<i64>,
}

/// pgvector text literal: "[1,2,3]"
fn vector_literal(embedding: &[f32]) -> String {
    format!(
        "[{}]",
        embedding
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(",")
    )
}

impl Repository {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut opt = sea_orm::ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
            .sqlx_logging(false);

        let db = sea_orm::Database::connect(opt).await?;
        Ok(Self { db })
    }

    /// Create the pgvector extension and all tables if they do not exist,
    /// mirroring the create-on-startup behavior the frontend expects.
    /// `embedding_dim` fixes the vector column width; changing the embedding
    /// model to a different dimension requires a manual migration.
    pub async fn init_schema(&self, embedding_dim: usize) -> Result<(), DbErr> {
        let statements = [
            "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
            r#"
            CREATE TABLE IF NOT EXISTS client_users (
                id UUID PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                name VARCHAR(255),
                profile_image VARCHAR(512),
                auth_provider VARCHAR(50) NOT NULL DEFAULT 'google',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#
            .to_string(),
            r#"
            CREATE TABLE IF NOT EXISTS assistants (
                id UUID PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                first_message TEXT,
                system_prompt TEXT,
                end_call_message TEXT,
                voice_name VARCHAR(100),
                elevenlabs_voice_id VARCHAR(255),
                voice_provider VARCHAR(50) NOT NULL DEFAULT 'elevenlabs',
                language VARCHAR(50) NOT NULL DEFAULT 'English',
                timezone VARCHAR(100),
                detect_caller_number BOOLEAN NOT NULL DEFAULT FALSE,
                multilingual_support BOOLEAN NOT NULL DEFAULT FALSE,
                voice_recording BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#
            .to_string(),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS knowledge_chunks (
                    id UUID PRIMARY KEY,
                    file_name VARCHAR(255),
                    file_type VARCHAR(50),
                    content TEXT NOT NULL,
                    chunk_index INTEGER NOT NULL DEFAULT 0,
                    embedding vector({embedding_dim}),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )
                "#
            ),
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id UUID PRIMARY KEY,
                calcom_booking_id BIGINT,
                calcom_booking_uid VARCHAR(255),
                attendee_name VARCHAR(255) NOT NULL,
                attendee_email VARCHAR(255) NOT NULL,
                attendee_phone VARCHAR(50),
                attendee_timezone VARCHAR(100) NOT NULL,
                start_time TIMESTAMPTZ NOT NULL,
                end_time TIMESTAMPTZ,
                event_type_id BIGINT NOT NULL,
                duration_minutes INTEGER NOT NULL DEFAULT 30,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                cancellation_reason TEXT,
                rescheduling_reason TEXT,
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#
            .to_string(),
            "CREATE INDEX IF NOT EXISTS idx_bookings_uid ON bookings (calcom_booking_uid)"
                .to_string(),
        ];

        for sql in statements {
            self.db
                .execute(Statement::from_string(DbBackend::Postgres, sql))
                .await?;
        }
        Ok(())
    }

    // ─── Knowledge store ────────────────────────────────────────────────

    /// Insert a batch of chunks in a single transaction and return the first
    /// created row as the representative handle. Either every chunk lands or
    /// none does.
    pub async fn create_chunks(
        &self,
        chunks: Vec<NewChunk>,
    ) -> Result<models::KnowledgeChunk, DbErr> {
        if chunks.is_empty() {
            return Err(DbErr::Custom("empty chunk batch".to_string()));
        }

        let created_at: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
        let txn = self.db.begin().await?;
        let mut first: Option<models::KnowledgeChunk> = None;

        for chunk in chunks {
            let id = Uuid::new_v4();

            // pgvector has no SeaORM value mapping, so the vector goes in as
            // a cast text parameter.
            let stmt = match &chunk.embedding {
                Some(embedding) => Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"
                    INSERT INTO knowledge_chunks
                        (id, file_name, file_type, content, chunk_index, embedding, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6::vector, $7)
                    "#,
                    vec![
                        id.into(),
                        chunk.file_name.clone().into(),
                        chunk.file_type.clone().into(),
                        chunk.content.clone().into(),
                        chunk.chunk_index.into(),
                        vector_literal(embedding).into(),
                        created_at.into(),
                    ],
                ),
                None => Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"
                    INSERT INTO knowledge_chunks
                        (id, file_name, file_type, content, chunk_index, embedding, created_at)
                    VALUES ($1, $2, $3, $4, $5, NULL, $6)
                    "#,
                    vec![
                        id.into(),
                        chunk.file_name.clone().into(),
                        chunk.file_type.clone().into(),
                        chunk.content.clone().into(),
                        chunk.chunk_index.into(),
                        created_at.into(),
                    ],
                ),
            };

            txn.execute(stmt).await?;

            if first.is_none() {
                first = Some(models::KnowledgeChunk {
                    id,
                    file_name: chunk.file_name,
                    file_type: chunk.file_type,
                    content: chunk.content,
                    chunk_index: chunk.chunk_index,
                    embedding: None,
                    created_at,
                });
            }
        }

        txn.commit().await?;

        // first is always Some here, the batch was non-empty
        first.ok_or_else(|| DbErr::Custom("empty chunk batch".to_string()))
    }

    /// All stored chunks, embedding omitted from the projection.
    pub async fn get_all_knowledge(&self) -> Result<Vec<models::KnowledgeChunk>, DbErr> {
        knowledge::Model::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT id, file_name, file_type, content, chunk_index,
                   NULL::text AS embedding, created_at
            FROM knowledge_chunks
            ORDER BY created_at ASC, chunk_index ASC
            "#,
        ))
        .all(&self.db)
        .await
    }

    /// Remove one chunk by id; false when no row matched.
    pub async fn delete_knowledge(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = knowledge::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Remove every chunk. Irreversible; callers gate this behind auth.
    pub async fn delete_all_knowledge(&self) -> Result<u64, DbErr> {
        let result = knowledge::Entity::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    pub async fn knowledge_stats(&self) -> Result<KnowledgeStats, DbErr> {
        let row = StatsRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT COUNT(*)::bigint AS total,
                   COUNT(embedding)::bigint AS processed,
                   SUM(LENGTH(content))::bigint AS bytes
            FROM knowledge_chunks
            "#,
        ))
        .one(&self.db)
        .await?
        .ok_or_else(|| DbErr::Custom("stats query returned no row".to_string()))?;

        let bytes = row.bytes.unwrap_or(0);
        Ok(KnowledgeStats {
            total_documents: row.total,
            processed: row.processed,
            pending: row.total - row.processed,
            storage_mb: (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
        })
    }

    /// k nearest chunks by L2 distance, nearest first. Chunks without an
    /// embedding are never candidates; ties break on id so repeated queries
    /// against an unchanged corpus return a stable order.
    pub async fn search_similar_chunks(
        &self,
        query_embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<(models::KnowledgeChunk, f64)>, DbErr> {
        let rows = ChunkDistanceRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT id, file_name, file_type, content, chunk_index, created_at,
                   (embedding <-> $1::vector)::float8 AS distance
            FROM knowledge_chunks
            WHERE embedding IS NOT NULL
            ORDER BY distance ASC, id ASC
            LIMIT $2
            "#,
            vec![
                vector_literal(query_embedding).into(),
                (limit as i64).into(),
            ],
        ))
        .all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    models::KnowledgeChunk {
                        id: r.id,
                        file_name: r.file_name,
                        file_type: r.file_type,
                        content: r.content,
                        chunk_index: r.chunk_index,
                        embedding: None,
                        created_at: r.created_at,
                    },
                    r.distance,
                )
            })
            .collect())
    }

    // ─── Assistants ─────────────────────────────────────────────────────

    pub async fn create_assistant(
        &self,
        new: NewAssistant,
    ) -> Result<models::Assistant, DbErr> {
        let active = assistant::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            description: Set(new.description),
            first_message: Set(new.first_message),
            system_prompt: Set(new.system_prompt),
            end_call_message: Set(new.end_call_message),
            voice_name: Set(new.voice_name),
            elevenlabs_voice_id: Set(new.elevenlabs_voice_id),
            voice_provider: Set(new.voice_provider),
            language: Set(new.language),
            timezone: Set(new.timezone),
            detect_caller_number: Set(new.detect_caller_number),
            multilingual_support: Set(new.multilingual_support),
            voice_recording: Set(new.voice_recording),
            created_at: Set(chrono::Utc::now().into()),
        };
        active.insert(&self.db).await
    }

    pub async fn get_assistants(&self) -> Result<Vec<models::Assistant>, DbErr> {
        assistant::Entity::find().all(&self.db).await
    }

    pub async fn get_assistant(&self, id: Uuid) -> Result<Option<models::Assistant>, DbErr> {
        assistant::Entity::find_by_id(id).one(&self.db).await
    }

    /// Persist a merged assistant update built by the service layer.
    pub async fn save_assistant(
        &self,
        active: assistant::ActiveModel,
    ) -> Result<models::Assistant, DbErr> {
        active.update(&self.db).await
    }

    pub async fn delete_assistant(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = assistant::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    // ─── Users ──────────────────────────────────────────────────────────

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<models::User>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    pub async fn create_user(
        &self,
        email: String,
        name: Option<String>,
        profile_image: Option<String>,
    ) -> Result<models::User, DbErr> {
        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            name: Set(name),
            profile_image: Set(profile_image),
            auth_provider: Set("google".to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        active.insert(&self.db).await
    }

    // ─── Bookings ───────────────────────────────────────────────────────

    pub async fn create_booking(&self, new: NewBooking) -> Result<models::Booking, DbErr> {
        let active = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            calcom_booking_id: Set(new.calcom_booking_id),
            calcom_booking_uid: Set(new.calcom_booking_uid),
            attendee_name: Set(new.attendee_name),
            attendee_email: Set(new.attendee_email),
            attendee_phone: Set(new.attendee_phone),
            attendee_timezone: Set(new.attendee_timezone),
            start_time: Set(new.start_time),
            end_time: Set(new.end_time),
            event_type_id: Set(new.event_type_id),
            duration_minutes: Set(new.duration_minutes),
            status: Set(new.status),
            cancellation_reason: Set(None),
            rescheduling_reason: Set(None),
            notes: Set(new.notes),
            created_at: Set(chrono::Utc::now().into()),
        };
        active.insert(&self.db).await
    }

    pub async fn find_booking_by_uid(
        &self,
        uid: &str,
    ) -> Result<Option<models::Booking>, DbErr> {
        booking::Entity::find()
            .filter(booking::Column::CalcomBookingUid.eq(uid))
            .one(&self.db)
            .await
    }

    pub async fn mark_booking_cancelled(
        &self,
        uid: &str,
        reason: Option<String>,
    ) -> Result<Option<models::Booking>, DbErr> {
        let Some(existing) = self.find_booking_by_uid(uid).await? else {
            return Ok(None);
        };
        let mut active: booking::ActiveModel = existing.into();
        active.status = Set(BookingStatus::Cancelled);
        active.cancellation_reason = Set(reason);
        Ok(Some(active.update(&self.db).await?))
    }

    pub async fn mark_booking_rescheduled(
        &self,
        uid: &str,
        new_start: chrono::DateTime<chrono::FixedOffset>,
        reason: Option<String>,
    ) -> Result<Option<models::Booking>, DbErr> {
        let Some(existing) = self.find_booking_by_uid(uid).await? else {
            return Ok(None);
        };
        let mut active: booking::ActiveModel = existing.into();
        active.status = Set(BookingStatus::Rescheduled);
        active.start_time = Set(new_start);
        active.rescheduling_reason = Set(reason);
        Ok(Some(active.update(&self.db).await?))
    }
}

#[async_trait]
impl KnowledgeStore for Repository {
    async fn create_chunks(
        &self,
        chunks: Vec<NewChunk>,
    ) -> Result<models::KnowledgeChunk, DbErr> {
        Repository::create_chunks(self, chunks).await
    }

    async fn get_all_knowledge(&self) -> Result<Vec<models::KnowledgeChunk>, DbErr> {
        Repository::get_all_knowledge(self).await
    }

    async fn delete_knowledge(&self, id: Uuid) -> Result<bool, DbErr> {
        Repository::delete_knowledge(self, id).await
    }

    async fn delete_all_knowledge(&self) -> Result<u64, DbErr> {
        Repository::delete_all_knowledge(self).await
    }

    async fn knowledge_stats(&self) -> Result<KnowledgeStats, DbErr> {
        Repository::knowledge_stats(self).await
    }

    async fn search_similar_chunks(
        &self,
        query_embedding: &[f32],
        limit: u64,
    ) -> Result<Vec<(models::KnowledgeChunk, f64)>, DbErr> {
        Repository::search_similar_chunks(self, query_embedding, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_formats_pgvector_input() {
        assert_eq!(vector_literal(&[1.0, 2.5, -3.0]), "[1,2.5,-3]");
        assert_eq!(vector_literal(&[]), "[]");
    }

    fn chunk(content: &str, index: i32, embedding: Option<Vec<f32>>) -> NewChunk {
        NewChunk {
            file_name: Some("a.txt".to_string()),
            file_type: Some("txt".to_string()),
            content: content.to_string(),
            chunk_index: index,
            embedding,
        }
    }

    /// Exercises the raw pgvector SQL against a live database. Set
    /// TEST_DATABASE_URL to a Postgres instance with the vector extension
    /// installed; without the variable the test is a no-op. The
    /// knowledge_chunks table is dropped and recreated.
    #[tokio::test]
    async fn knowledge_sql_round_trip_against_postgres() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };

        let repo = Repository::new(&DatabaseConfig {
            url,
            max_connections: 2,
            min_connections: 1,
            connect_timeout: 10,
        })
        .await
        .unwrap();

        repo.db
            .execute(Statement::from_string(
                DbBackend::Postgres,
                "DROP TABLE IF EXISTS knowledge_chunks".to_string(),
            ))
            .await
            .unwrap();
        repo.init_schema(3).await.unwrap();

        // Two rows with identical embeddings (a distance tie) and one with
        // no embedding at all.
        repo.create_chunks(vec![
            chunk("alpha", 0, Some(vec![0.0, 0.0, 0.0])),
            chunk("beta", 1, Some(vec![0.0, 0.0, 0.0])),
            chunk("gamma", 2, None),
        ])
        .await
        .unwrap();

        // Round-trip: content and provenance survive storage unchanged
        let all = repo.get_all_knowledge().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].content, "alpha");
        assert_eq!(all[0].file_name.as_deref(), Some("a.txt"));
        assert_eq!(all[0].file_type.as_deref(), Some("txt"));
        assert_eq!(all[1].chunk_index, 1);

        // Rows without an embedding are never search candidates
        let hits = repo.search_similar_chunks(&[0.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|(c, _)| c.content != "gamma"));

        // Equal distances break on id, so repeated queries return the same
        // ordered id sequence
        let ids: Vec<Uuid> = hits.iter().map(|(c, _)| c.id).collect();
        assert!(ids[0] < ids[1]);
        let again = repo.search_similar_chunks(&[0.0, 0.0, 0.0], 10).await.unwrap();
        let ids_again: Vec<Uuid> = again.iter().map(|(c, _)| c.id).collect();
        assert_eq!(ids, ids_again);

        // delete_knowledge: not-found vs exact-row removal
        assert!(!repo.delete_knowledge(Uuid::new_v4()).await.unwrap());
        assert!(repo.delete_knowledge(all[0].id).await.unwrap());
        let remaining = repo.get_all_knowledge().await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|c| c.id != all[0].id));

        // delete_all_knowledge empties the table
        assert_eq!(repo.delete_all_knowledge().await.unwrap(), 2);
        assert!(repo.get_all_knowledge().await.unwrap().is_empty());
    }
}
