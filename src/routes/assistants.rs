use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::services::assistants::AssistantUpdate;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub description: Option<String>,
}

#[instrument(skip(state))]
pub async fn create_agent(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Assistant name is required".to_string()));
    }

    let assistant = state
        .assistants
        .create(payload.name, payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(assistant)))
}

#[instrument(skip(state))]
pub async fn list_agents(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let assistants = state.assistants.list().await?;
    Ok(Json(assistants))
}

#[instrument(skip(state))]
pub async fn get_agent(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state.assistants.get(agent_id).await?;
    Ok(Json(assistant))
}

#[instrument(skip(state))]
pub async fn update_agent(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(agent_id): Path<Uuid>,
    Json(payload): Json<AssistantUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state.assistants.update(agent_id, payload).await?;
    Ok(Json(assistant))
}

#[instrument(skip(state))]
pub async fn delete_agent(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.assistants.delete(agent_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Assistant deleted successfully"
    })))
}
