//! Client endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{Client, ClientRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_cpf_cnpj, validate_email, validate_path_id, validate_phone, validate_required,
};

fn validate_request(req: &ClientRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("name", validate_required(&req.name, "Name", 150))
        .check("cpfCnpj", validate_cpf_cnpj(&req.cpf_cnpj))
        .check("email", validate_email(&req.email))
        .check("phone", validate_phone(&req.phone));
    errors.finish()
}

pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.clients.list().await?))
}

pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Client>, ApiError> {
    validate_path_id(&id)?;
    Ok(Json(state.clients.get(&id).await?))
}

pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRequest>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    validate_request(&req)?;
    let client = state.clients.create(req).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ClientRequest>,
) -> Result<Json<Client>, ApiError> {
    validate_path_id(&id)?;
    validate_request(&req)?;
    Ok(Json(state.clients.update(&id, req).await?))
}

pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_path_id(&id)?;
    state.clients.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request_collects_all_fields() {
        let req = ClientRequest {
            name: "  ".to_string(),
            cpf_cnpj: "123".to_string(),
            email: Some("bad".to_string()),
            phone: None,
        };
        let err = validate_request(&req).unwrap_err();
        assert!(err.to_string().contains("3 fields"));
    }

    #[test]
    fn test_validate_request_accepts_formatted_cnpj() {
        let req = ClientRequest {
            name: "ACME Ltda".to_string(),
            cpf_cnpj: "11.222.333/0001-81".to_string(),
            email: Some("contato@acme.com.br".to_string()),
            phone: Some("+55 (11) 3333-4444".to_string()),
        };
        assert!(validate_request(&req).is_ok());
    }
}
