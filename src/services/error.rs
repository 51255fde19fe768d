use thiserror::Error;

use crate::auth::password::HashError;
use crate::auth::token::TokenError;

/// Errors raised by the domain services. Mapped to HTTP responses in `api::error`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} not found with id: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(
        "Cannot delete this {entity}: {count} {dependent}(s) still reference it. Delete the {dependent}(s) first"
    )]
    DataIntegrityViolation {
        entity: &'static str,
        dependent: &'static str,
        count: i64,
    },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_message_names_dependent_and_count() {
        let err = ServiceError::DataIntegrityViolation {
            entity: "client",
            dependent: "process",
            count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 process(s)"));
        assert!(msg.contains("Delete the process(s) first"));
    }

    #[test]
    fn test_not_found_message() {
        let err = ServiceError::not_found("client", "abc");
        assert_eq!(err.to_string(), "client not found with id: abc");
    }
}
