//! Input validation for API requests.
//!
//! Field checks return `Result<(), String>`. Handlers collect them per request
//! with the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::ApiError;
use crate::db::MIN_DURATION_MINUTES;
use crate::services::appointments::is_valid_date_time;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)+$"
    ).unwrap();

    /// CPF (11 digits) or CNPJ (14 digits), with or without the usual punctuation
    static ref CPF_CNPJ_REGEX: Regex = Regex::new(
        r"^(\d{3}\.?\d{3}\.?\d{3}-?\d{2}|\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})$"
    ).unwrap();

    /// Letters, digits, dot, dash and underscore
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();

    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()-]{8,20}$").unwrap();
}

const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// Path ids must be UUIDs; anything else is a bad request rather than a miss
pub fn validate_path_id(id: &str) -> Result<(), ApiError> {
    validate_uuid(id, "id").map_err(|e| ApiError::validation_field("id", e))
}

pub fn validate_required(value: &str, label: &str, max_len: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", label));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("{} is too long (max {} characters)", label, max_len));
    }
    Ok(())
}

pub fn validate_email(email: &Option<String>) -> Result<(), String> {
    match email.as_deref() {
        None | Some("") => Ok(()),
        Some(e) if e.len() > 254 => Err("Email is too long (max 254 characters)".to_string()),
        Some(e) if EMAIL_REGEX.is_match(e) => Ok(()),
        Some(_) => Err("Invalid email format".to_string()),
    }
}

pub fn validate_phone(phone: &Option<String>) -> Result<(), String> {
    match phone.as_deref() {
        None | Some("") => Ok(()),
        Some(p) if PHONE_REGEX.is_match(p) => Ok(()),
        Some(_) => Err("Invalid phone number format".to_string()),
    }
}

pub fn validate_cpf_cnpj(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("CPF/CNPJ is required".to_string());
    }
    if !CPF_CNPJ_REGEX.is_match(value) {
        return Err("CPF/CNPJ must have 11 (CPF) or 14 (CNPJ) digits".to_string());
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    validate_required(username, "Username", 50)?;
    if username.len() < 3 {
        return Err("Username is too short (min 3 characters)".to_string());
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err("Username may only contain letters, digits, '.', '-' and '_'".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password is too short (min {} characters)",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }
    Ok(())
}

pub fn validate_date_time(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("Date and time are required".to_string());
    }
    if !is_valid_date_time(value) {
        return Err(
            "Date and time must be an ISO 8601 local date-time, e.g. 2024-05-02T14:30:00"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_duration(minutes: i64) -> Result<(), String> {
    if minutes < MIN_DURATION_MINUTES {
        return Err(format!(
            "Duration must be at least {} minutes",
            MIN_DURATION_MINUTES
        ));
    }
    if minutes > 24 * 60 {
        return Err("Duration cannot exceed 24 hours".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
        assert!(validate_uuid("", "id").is_err());
        assert!(validate_uuid("123", "id").is_err());
        assert!(validate_path_id("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_cpf_cnpj() {
        assert!(validate_cpf_cnpj("12345678909").is_ok());
        assert!(validate_cpf_cnpj("123.456.789-09").is_ok());
        assert!(validate_cpf_cnpj("11222333000181").is_ok());
        assert!(validate_cpf_cnpj("11.222.333/0001-81").is_ok());

        assert!(validate_cpf_cnpj("").is_err());
        assert!(validate_cpf_cnpj("1234567890").is_err());
        assert!(validate_cpf_cnpj("123456789012").is_err());
        assert!(validate_cpf_cnpj("abc.def.ghi-jk").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(&None).is_ok());
        assert!(validate_email(&Some(String::new())).is_ok());
        assert!(validate_email(&Some("ana@example.com".to_string())).is_ok());
        assert!(validate_email(&Some("ana.souza+law@firm.com.br".to_string())).is_ok());

        assert!(validate_email(&Some("ana@".to_string())).is_err());
        assert!(validate_email(&Some("ana.example.com".to_string())).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ana.souza").is_ok());
        assert!(validate_username("admin").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("ana souza").is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(15).is_ok());
        assert!(validate_duration(90).is_ok());
        assert!(validate_duration(14).is_err());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(24 * 60 + 1).is_err());
    }
}
