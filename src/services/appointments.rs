//! Appointment booking through Cal.com.
//!
//! Cal.com holds the authoritative booking state; each successful call is
//! mirrored into the local `bookings` table best-effort so a database hiccup
//! never loses a booking that Cal.com already accepted.

use chrono::NaiveDate;
use serde_json::Value;

use crate::db::models::BookingStatus;
use crate::db::{NewBooking, Repository};
use crate::errors::AppError;
use crate::integrations::calcom::CalcomClient;

/// Start time for the local mirror record. A failed parse is logged so a
/// skipped mirror write stays diagnosable.
fn parse_start(start: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    match chrono::DateTime::parse_from_rfc3339(start) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(error = %e, start, "Start time is not RFC 3339; local record not updated");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookAppointment {
    pub start: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub timezone: String,
    pub notes: Option<String>,
}

pub struct AppointmentService {
    calcom: CalcomClient,
    repo: Repository,
}

impl AppointmentService {
    pub fn new(calcom: CalcomClient, repo: Repository) -> Self {
        Self { calcom, repo }
    }

    /// Slots for one day (YYYY-MM-DD) in the given timezone.
    pub async fn available_slots(&self, date: &str, timezone: &str) -> Result<Value, AppError> {
        let start = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("invalid date '{}'", date)))?;
        let end = start
            .succ_opt()
            .ok_or_else(|| AppError::Validation(format!("invalid date '{}'", date)))?;

        self.calcom
            .get_available_slots(date, &end.format("%Y-%m-%d").to_string(), timezone)
            .await
    }

    pub async fn book(&self, request: BookAppointment) -> Result<Value, AppError> {
        let response = self
            .calcom
            .create_booking(
                &request.start,
                &request.name,
                &request.email,
                &request.timezone,
                request.phone.as_deref(),
                request.notes.as_deref(),
            )
            .await?;

        let data = &response["data"];
        let start_time = data["start"].as_str().and_then(parse_start);
        let end_time = data["end"]
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok());

        if let Some(start_time) = start_time {
            let new_booking = NewBooking {
                calcom_booking_id: data["id"].as_i64(),
                calcom_booking_uid: data["uid"].as_str().map(str::to_string),
                attendee_name: request.name.clone(),
                attendee_email: request.email.clone(),
                attendee_phone: request.phone.clone(),
                attendee_timezone: request.timezone.clone(),
                start_time,
                end_time,
                event_type_id: data["eventTypeId"]
                    .as_i64()
                    .unwrap_or_else(|| self.calcom.event_type_id()),
                duration_minutes: data["duration"].as_i64().unwrap_or(30) as i32,
                status: BookingStatus::Accepted,
                notes: request.notes.clone(),
            };

            // Cal.com accepted the booking; a failed mirror write is logged,
            // not surfaced.
            if let Err(e) = self.repo.create_booking(new_booking).await {
                tracing::warn!(error = %e, "Failed to mirror booking locally");
            }
        } else {
            tracing::warn!("Cal.com response missing start time; local record skipped");
        }

        tracing::info!(
            uid = data["uid"].as_str().unwrap_or(""),
            email = %request.email,
            "Appointment booked"
        );

        Ok(response)
    }

    pub async fn get(&self, booking_uid: &str) -> Result<Value, AppError> {
        self.calcom.get_booking(booking_uid).await
    }

    pub async fn cancel(
        &self,
        booking_uid: &str,
        reason: Option<String>,
    ) -> Result<Value, AppError> {
        let response = self.calcom.cancel_booking(booking_uid, reason.as_deref()).await?;

        if let Err(e) = self
            .repo
            .mark_booking_cancelled(booking_uid, reason)
            .await
        {
            tracing::warn!(error = %e, "Failed to mark local booking cancelled");
        }

        Ok(response)
    }

    pub async fn reschedule(
        &self,
        booking_uid: &str,
        new_start: &str,
        reason: Option<String>,
    ) -> Result<Value, AppError> {
        let response = self
            .calcom
            .reschedule_booking(booking_uid, new_start, reason.as_deref())
            .await?;

        if let Some(start_time) = parse_start(new_start) {
            if let Err(e) = self
                .repo
                .mark_booking_rescheduled(booking_uid, start_time, reason)
                .await
            {
                tracing::warn!(error = %e, "Failed to mark local booking rescheduled");
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_start_times_parse_for_the_local_record() {
        assert!(parse_start("2026-03-01T10:00:00Z").is_some());
        assert!(parse_start("2026-03-01T10:00:00+05:30").is_some());
        assert!(parse_start("tomorrow at ten").is_none());
        assert!(parse_start("2026-03-01").is_none());
    }
}
