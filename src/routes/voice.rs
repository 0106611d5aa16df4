use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub text: String,
    pub voice_id: String,
}

/// Synthesize a short voice preview with the given ElevenLabs voice.
#[instrument(skip(state, payload))]
pub async fn preview(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<PreviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }
    if payload.voice_id.trim().is_empty() {
        return Err(AppError::Validation("Voice id is required".to_string()));
    }

    let audio = state.tts.synthesize(&payload.text, &payload.voice_id).await?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
