use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::appointments::BookAppointment;
use crate::services::AppState;

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SlotsParams {
    pub date: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub start: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub start: String,
    pub reason: Option<String>,
}

#[instrument(skip(state))]
pub async fn available_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotsParams>,
) -> Result<impl IntoResponse, AppError> {
    let slots = state
        .appointments
        .available_slots(&params.date, &params.timezone)
        .await?;
    Ok(Json(slots))
}

#[instrument(skip(state, payload))]
pub async fn book(
    State(state): State<AppState>,
    Json(payload): Json<BookRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let booking = state
        .appointments
        .book(BookAppointment {
            start: payload.start,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            timezone: payload.timezone,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_uid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.appointments.get(&booking_uid).await?;
    Ok(Json(booking))
}

#[instrument(skip(state, payload))]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_uid): Path<String>,
    Json(payload): Json<CancelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .appointments
        .cancel(&booking_uid, payload.reason)
        .await?;
    Ok(Json(result))
}

#[instrument(skip(state, payload))]
pub async fn reschedule_booking(
    State(state): State<AppState>,
    Path(booking_uid): Path<String>,
    Json(payload): Json<RescheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .appointments
        .reschedule(&booking_uid, &payload.start, payload.reason)
        .await?;
    Ok(Json(result))
}
