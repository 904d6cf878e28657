//! Account route handlers: profile and addresses.
//!
//! These routes require authentication. Addresses are always scoped to the
//! session user; another user's address id behaves like a missing one.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use kemet_core::AddressId;

use crate::db::addresses::AddressRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::address::{Address, CreateAddressInput, UpdateAddressInput};
use crate::models::user::User;
use crate::state::AppState;

use super::{ApiSuccess, ok};

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

/// Get the current user's profile.
///
/// GET /api/user/profile
///
/// # Errors
///
/// Returns `AppError::NotFound` if the session user no longer exists.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiSuccess<User>>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ok(user))
}

/// Update the current user's profile.
///
/// PUT /api/user/profile
///
/// # Errors
///
/// Returns `AppError::Validation` for names shorter than 2 characters.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiSuccess<User>>> {
    if let Some(name) = &req.name
        && name.trim().len() < 2
    {
        return Err(AppError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .update_profile(user.id, req.name.as_deref())
        .await?;

    Ok(ok(user))
}

/// List the user's addresses, default first.
///
/// GET /api/user/addresses
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiSuccess<Vec<Address>>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(ok(addresses))
}

/// Create an address.
///
/// POST /api/user/addresses
///
/// Setting `is_default` unsets the previous default in the same
/// transaction.
///
/// # Errors
///
/// Returns `AppError::Validation` for field-level constraint violations.
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateAddressInput>,
) -> Result<(StatusCode, Json<ApiSuccess<Address>>)> {
    input.validate().map_err(AppError::Validation)?;

    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    Ok(super::created(address))
}

/// Update an address.
///
/// PUT /api/user/addresses/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the address doesn't exist or belongs to
/// another user.
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<UpdateAddressInput>,
) -> Result<Json<ApiSuccess<Address>>> {
    let address = AddressRepository::new(state.pool())
        .update(AddressId::new(id), user.id, &input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Address not found".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(ok(address))
}

/// Delete an address.
///
/// DELETE /api/user/addresses/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the address doesn't exist or belongs to
/// another user, and `AppError::Database` with a conflict when the address
/// is still referenced by orders.
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ApiSuccess<Value>>> {
    let deleted = AddressRepository::new(state.pool())
        .delete(AddressId::new(id), user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Address not found".to_string()));
    }

    Ok(ok(json!({ "message": "Address deleted successfully" })))
}
