use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type. Upstream provider errors carry the provider's
/// original error text so failures stay diagnosable at the caller.
#[derive(Error, Debug)]
pub enum AppError {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    // Input validation
    #[error("Unsupported file type '{0}'. Only PDF, DOCX, TXT allowed.")]
    UnsupportedFileType(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed to parse document: {0}")]
    DocumentParse(String),

    // Authentication
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Resource lookup
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    // Upstream providers
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Language model error: {0}")]
    LlmProvider(String),

    #[error("TTS provider error: {0}")]
    TtsProvider(String),

    #[error("Cal.com error: {0}")]
    Calcom(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    // Internal
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DocumentParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::EmbeddingProvider(_)
            | Self::LlmProvider(_)
            | Self::TtsProvider(_)
            | Self::Calcom(_) => StatusCode::BAD_GATEWAY,
            Self::OAuth(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            AppError::UnsupportedFileType(_)
            | AppError::Validation(_)
            | AppError::DocumentParse(_)
            | AppError::NotFound { .. } => {
                tracing::debug!(%message, "Client error");
            }
            AppError::Unauthorized(_) | AppError::OAuth(_) => {
                tracing::info!(%message, "Auth error");
            }
            _ => {
                tracing::error!(%message, error = ?self, "Server error");
            }
        }

        let body = Json(json!({
            "error": {
                "status": status.as_u16(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
