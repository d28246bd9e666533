//! Axum route handlers for the Auth API, plus the middleware guarding the editor.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::state::AppState;

const INCORRECT_PASSWORD: &str = "Incorrect password. Please try again.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub protection_enabled: bool,
    pub authenticated: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    if !state.gate.verify(&request.password).await? {
        warn!("Rejected editor login");
        return Err(AppError::Unauthorized(INCORRECT_PASSWORD.to_string()));
    }

    let purged = state.sessions.purge_expired().await;
    if purged > 0 {
        info!("Purged {purged} expired sessions");
    }

    let session = state.sessions.issue().await;
    info!("Editor session issued, expires at {}", session.expires_at);
    Ok(Json(session))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        if state.sessions.logout(token).await {
            info!("Editor session ended");
        }
    }
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/status
pub async fn handle_status(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthStatus> {
    let expires_at = match bearer_token(&headers) {
        Some(token) => state.sessions.validate(token).await,
        None => None,
    };
    let protection_enabled = state.gate.is_enabled();

    Json(AuthStatus {
        protection_enabled,
        authenticated: !protection_enabled || expires_at.is_some(),
        expires_at,
    })
}

/// Lets a request through when the gate is open or it carries a live session.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.gate.is_enabled() {
        return Ok(next.run(request).await);
    }

    let authorized = match bearer_token(request.headers()) {
        Some(token) => state.sessions.validate(token).await.is_some(),
        None => false,
    };
    if !authorized {
        return Err(AppError::Unauthorized(
            "Please log in to edit this portfolio".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }
}
