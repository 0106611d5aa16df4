use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::models;
use crate::errors::AppError;
use crate::ingestion::parser::FileType;
use crate::services::AppState;

/// Default number of chunks retrieved per query.
const DEFAULT_QUERY_LIMIT: u64 = 3;
const MAX_QUERY_LIMIT: u64 = 20;

#[derive(Serialize)]
pub struct UploadResponse {
    pub knowledge: models::KnowledgeChunk,
    pub chunks_created: usize,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
}

/// Upload a document (multipart field `file`) into the global knowledge
/// base. The declared extension is validated before the body is parsed.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("file name is required".to_string()))?;

        // Reject unsupported extensions before reading the body
        FileType::from_filename(&file_name)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read file: {}", e)))?;

        let outcome = state.knowledge.ingest_document(&file_name, &data).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                knowledge: outcome.representative,
                chunks_created: outcome.chunk_count,
            }),
        ));
    }

    Err(AppError::Validation(
        "multipart field 'file' is required".to_string(),
    ))
}

#[instrument(skip(state))]
pub async fn list_knowledge(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let chunks = state.knowledge.list().await?;
    Ok(Json(chunks))
}

#[instrument(skip(state))]
pub async fn knowledge_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.knowledge.stats().await?;
    Ok(Json(stats))
}

/// Answer a free-text question from the knowledge base.
#[instrument(skip(state))]
pub async fn query_knowledge(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.query.trim().is_empty() {
        return Err(AppError::Validation("Query cannot be empty".to_string()));
    }

    let limit = payload
        .limit
        .unwrap_or(DEFAULT_QUERY_LIMIT)
        .clamp(1, MAX_QUERY_LIMIT);

    let answer = state.rag.answer(&payload.query, limit).await?;

    Ok(Json(QueryResponse {
        query: payload.query,
        answer,
    }))
}

#[instrument(skip(state))]
pub async fn delete_knowledge(
    State(state): State<AppState>,
    Path(knowledge_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.knowledge.delete(knowledge_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Knowledge deleted successfully"
    })))
}

/// Reset the whole knowledge base. Irreversible, hence auth-gated.
#[instrument(skip(state))]
pub async fn delete_all_knowledge(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    state.knowledge.delete_all().await?;
    Ok(Json(serde_json::json!({
        "message": "All global knowledge deleted successfully"
    })))
}
