//! Appointment models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Shortest bookable slot
pub const MIN_DURATION_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    /// ISO 8601 local date-time, e.g. `2024-05-02T14:30:00`
    pub date_time: String,
    pub duration_minutes: i64,
    pub lawyer_id: String,
    pub client_id: String,
    pub process_id: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub date_time: String,
    pub duration_minutes: i64,
    pub lawyer_id: String,
    pub client_id: String,
    #[serde(default)]
    pub process_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
