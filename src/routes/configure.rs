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
use crate::services::assistants::ConfigureUpdate;
use crate::services::AppState;

#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub assistant_id: Uuid,
    pub voice_name: Option<String>,
    pub elevenlabs_voice_id: Option<String>,
    pub voice_provider: String,
    pub language: String,
    pub timezone: Option<String>,
    pub detect_caller_number: bool,
    pub multilingual_support: bool,
    pub voice_recording: bool,
}

impl From<models::Assistant> for ConfigureResponse {
    fn from(assistant: models::Assistant) -> Self {
        Self {
            assistant_id: assistant.id,
            voice_name: assistant.voice_name,
            elevenlabs_voice_id: assistant.elevenlabs_voice_id,
            voice_provider: assistant.voice_provider,
            language: assistant.language,
            timezone: assistant.timezone,
            detect_caller_number: assistant.detect_caller_number,
            multilingual_support: assistant.multilingual_support,
            voice_recording: assistant.voice_recording,
        }
    }
}

/// Reading the configure section is public; writes require auth.
#[instrument(skip(state))]
pub async fn get_configure(
    State(state): State<AppState>,
    Path(assistant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state.assistants.get(assistant_id).await?;
    Ok(Json(ConfigureResponse::from(assistant)))
}

#[instrument(skip(state))]
pub async fn update_configure(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(assistant_id): Path<Uuid>,
    Json(payload): Json<ConfigureUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let assistant = state
        .assistants
        .update_configure(assistant_id, payload)
        .await?;
    Ok(Json(ConfigureResponse::from(assistant)))
}

#[instrument(skip(state))]
pub async fn reset_configure(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(assistant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.assistants.reset_configure(assistant_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Assistant configuration reset successfully"
    })))
}
