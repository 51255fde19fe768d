//! Appointment endpoints, including a lawyer's agenda.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{Appointment, AppointmentRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_date_time, validate_duration, validate_path_id, validate_uuid};

fn validate_request(req: &AppointmentRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("dateTime", validate_date_time(&req.date_time))
        .check("durationMinutes", validate_duration(req.duration_minutes))
        .check("lawyerId", validate_uuid(&req.lawyer_id, "lawyerId"))
        .check("clientId", validate_uuid(&req.client_id, "clientId"));
    if let Some(process_id) = &req.process_id {
        errors.check("processId", validate_uuid(process_id, "processId"));
    }
    errors.finish()
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    Ok(Json(state.appointments.list().await?))
}

pub async fn list_by_lawyer(
    State(state): State<Arc<AppState>>,
    Path(lawyer_id): Path<String>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    validate_path_id(&lawyer_id)?;
    Ok(Json(state.appointments.list_by_lawyer(&lawyer_id).await?))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    validate_path_id(&id)?;
    Ok(Json(state.appointments.get(&id).await?))
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    validate_request(&req)?;
    let appointment = state.appointments.create(req).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    validate_path_id(&id)?;
    validate_request(&req)?;
    Ok(Json(state.appointments.update(&id, req).await?))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_path_id(&id)?;
    state.appointments.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
