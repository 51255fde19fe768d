use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::AuthUser;
use crate::db::{AuthResponse, LoginRequest};
use crate::services::ServiceError;
use crate::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "jwt";

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn session_cookie(value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .secure(secure)
        .build()
}

/// Login endpoint. The token travels only in the cookie, never in the body.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let outcome = state.auth.login(&request.username, &request.password).await?;

    let auth_config = &state.config.auth;
    let cookie = session_cookie(
        outcome.token.token,
        auth_config.cookie_max_age_secs(),
        auth_config.cookie_secure,
    );

    Ok((jar.add(cookie), Json(outcome.response)))
}

/// Logout endpoint. Always succeeds and always expires the cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let cookie = session_cookie(String::new(), 0, state.config.auth.cookie_secure);
    (
        jar.add(cookie),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<AuthResponse>, ApiError> {
    let profile = state.auth.current_user(&user).await?;
    Ok(Json(profile))
}

/// Token from the session cookie, falling back to `Authorization: Bearer`
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// Auth middleware that validates the session token and attaches the identity
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let user = state.auth.authenticate(&token)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// User management is reserved for administrators
pub fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::warn!(username = %user.username, "Non-admin attempted user management");
        Err(ServiceError::Forbidden("Administrator role required".to_string()).into())
    }
}

/// Extractor for the identity attached by `auth_middleware`
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
