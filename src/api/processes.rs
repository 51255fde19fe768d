//! Process endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{Process, ProcessRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_path_id, validate_required, validate_uuid};

fn validate_request(req: &ProcessRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("number", validate_required(&req.number, "Process number", 50))
        .check("clientId", validate_uuid(&req.client_id, "clientId"))
        .check("status", validate_required(&req.status, "Status", 30));
    if let Some(description) = &req.description {
        if description.len() > 2000 {
            errors.add("description", "Description is too long (max 2000 characters)");
        }
    }
    errors.finish()
}

pub async fn list_processes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Process>>, ApiError> {
    Ok(Json(state.processes.list().await?))
}

pub async fn get_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Process>, ApiError> {
    validate_path_id(&id)?;
    Ok(Json(state.processes.get(&id).await?))
}

pub async fn create_process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<(StatusCode, Json<Process>), ApiError> {
    validate_request(&req)?;
    let process = state.processes.create(req).await?;
    Ok((StatusCode::CREATED, Json(process)))
}

pub async fn update_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<Process>, ApiError> {
    validate_path_id(&id)?;
    validate_request(&req)?;
    Ok(Json(state.processes.update(&id, req).await?))
}

pub async fn delete_process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_path_id(&id)?;
    state.processes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
