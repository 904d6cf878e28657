//! Authentication route handlers.
//!
//! Registration, login, and logout. Login stores the minimal user identity
//! in the Postgres-backed session; the auth extractors read it back.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::session::CurrentUser;
use crate::models::user::User;
use crate::services::AuthService;
use crate::state::AppState;

use super::{ApiSuccess, ok};

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration response body.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

/// Register a new customer account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// Returns `AppError::Auth` for invalid email, weak password, or duplicate
/// email.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiSuccess<RegisterResponse>>)> {
    if let Some(name) = &req.name
        && name.trim().len() < 2
    {
        return Err(AppError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }

    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&req.email, &req.password, req.name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(super::created(RegisterResponse {
        message: "User created successfully".to_string(),
        user,
    }))
}

/// Login with email and password, starting a session.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns `AppError::Auth` with a 401 for wrong credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiSuccess<User>>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&req.email, &req.password).await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ok(user))
}

/// Logout, clearing the session.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// Returns `AppError::Internal` if the session cannot be modified.
pub async fn logout(session: Session) -> Result<Json<ApiSuccess<Value>>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(ok(json!({ "message": "Logged out successfully" })))
}
