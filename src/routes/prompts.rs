use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::models;
use crate::errors::AppError;
use crate::services::assistants::PromptUpdate;
use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub assistant_id: Uuid,
    pub first_message: Option<String>,
    pub system_prompt: Option<String>,
    pub end_call_message: Option<String>,
}

impl From<models::Assistant> for PromptResponse {
    fn from(assistant: models::Assistant) -> Self {
        Self {
            assistant_id: assistant.id,
            first_message: assistant.first_message,
            system_prompt: assistant.system_prompt,
            end_call_message: assistant.end_call_message,
        }
    }
}

#[instrument(skip(state))]
pub async fn get_prompt(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state.assistants.get(agent_id).await?;
    Ok(Json(PromptResponse::from(assistant)))
}

#[instrument(skip(state))]
pub async fn set_prompt(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(agent_id): Path<Uuid>,
    Json(payload): Json<PromptUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state.assistants.set_prompt(agent_id, payload).await?;
    Ok(Json(PromptResponse::from(assistant)))
}

#[instrument(skip(state))]
pub async fn delete_prompt(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state.assistants.clear_prompt(agent_id).await?;
    Ok(Json(PromptResponse::from(assistant)))
}
