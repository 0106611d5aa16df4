use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
}

/// Callback URL derived from the incoming Host header so the same build
/// works on localhost and behind the deployed hostname.
fn callback_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost:8000");
    let scheme = if host.starts_with("localhost") || host.starts_with("127.0.0.1") {
        "http"
    } else {
        "https"
    };
    format!("{}://{}/auth/google/callback", scheme, host)
}

#[instrument(skip(state, headers))]
pub async fn google_login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let url = state.google.authorize_url(&callback_url(&headers));
    Redirect::temporary(&url)
}

#[instrument(skip(state, headers, params))]
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    let info = state
        .google
        .fetch_user_info(&params.code, &callback_url(&headers))
        .await?;

    let user = match state.repo.find_user_by_email(&info.email).await? {
        Some(user) => user,
        None => {
            state
                .repo
                .create_user(info.email.clone(), info.name, info.picture)
                .await?
        }
    };

    let access_token = state.jwt.issue_token(&user.id.to_string(), &user.email)?;

    tracing::info!(user_id = %user.id, "User logged in via Google");

    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "access_token": access_token,
        "token_type": "bearer",
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "profile_image": user.profile_image,
        }
    })))
}
