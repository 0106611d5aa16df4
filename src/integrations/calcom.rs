//! Cal.com v2 API client.
//!
//! Thin wrapper over the booking endpoints the assistant uses. Cal.com
//! responses are passed through as JSON; only the fields the services need
//! are picked out by the callers.

use serde_json::Value;

use crate::config::CalcomConfig;
use crate::errors::AppError;

/// The slots endpoint requires a newer API version than the booking
/// endpoints.
const SLOTS_API_VERSION: &str = "2024-09-04";

pub struct CalcomClient {
    client: reqwest::Client,
    config: CalcomConfig,
}

impl CalcomClient {
    pub fn new(config: CalcomConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn event_type_id(&self) -> i64 {
        self.config.event_type_id
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<Value, AppError> {
        let res = req
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| AppError::Calcom(format!("request failed: {}", e)))?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AppError::Calcom(format!("API error {}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::Calcom(format!("parse error: {}", e)))
    }

    /// Available slots for the configured event type between two dates
    /// (YYYY-MM-DD), in the given timezone.
    pub async fn get_available_slots(
        &self,
        start_date: &str,
        end_date: &str,
        timezone: &str,
    ) -> Result<Value, AppError> {
        let req = self
            .client
            .get(format!("{}/slots", self.config.base_url))
            .header("cal-api-version", SLOTS_API_VERSION)
            .query(&[
                ("eventTypeId", self.config.event_type_id.to_string()),
                ("start", start_date.to_string()),
                ("end", end_date.to_string()),
                ("timeZone", timezone.to_string()),
            ]);
        self.execute(req).await
    }

    /// Create a booking starting at `start` (ISO 8601 UTC).
    pub async fn create_booking(
        &self,
        start: &str,
        name: &str,
        email: &str,
        timezone: &str,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut attendee = serde_json::json!({
            "name": name,
            "email": email,
            "timeZone": timezone,
            "language": "en",
        });
        if let Some(phone) = phone {
            attendee["phoneNumber"] = Value::String(phone.to_string());
        }

        let mut payload = serde_json::json!({
            "start": start,
            "eventTypeId": self.config.event_type_id,
            "attendee": attendee,
        });
        if let Some(notes) = notes {
            payload["bookingFieldsResponses"] = serde_json::json!({ "notes": notes });
        }

        let req = self
            .client
            .post(format!("{}/bookings", self.config.base_url))
            .header("cal-api-version", &self.config.api_version)
            .json(&payload);
        self.execute(req).await
    }

    pub async fn get_booking(&self, booking_uid: &str) -> Result<Value, AppError> {
        let req = self
            .client
            .get(format!("{}/bookings/{}", self.config.base_url, booking_uid))
            .header("cal-api-version", &self.config.api_version);
        self.execute(req).await
    }

    pub async fn cancel_booking(
        &self,
        booking_uid: &str,
        reason: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut payload = serde_json::json!({});
        if let Some(reason) = reason {
            payload["cancellationReason"] = Value::String(reason.to_string());
        }

        let req = self
            .client
            .post(format!(
                "{}/bookings/{}/cancel",
                self.config.base_url, booking_uid
            ))
            .header("cal-api-version", &self.config.api_version)
            .json(&payload);
        self.execute(req).await
    }

    pub async fn reschedule_booking(
        &self,
        booking_uid: &str,
        new_start: &str,
        reason: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut payload = serde_json::json!({ "start": new_start });
        if let Some(reason) = reason {
            payload["reschedulingReason"] = Value::String(reason.to_string());
        }

        let req = self
            .client
            .post(format!(
                "{}/bookings/{}/reschedule",
                self.config.base_url, booking_uid
            ))
            .header("cal-api-version", &self.config.api_version)
            .json(&payload);
        self.execute(req).await
    }
}
