//! Category route handlers.

use axum::{Json, extract::State};

use crate::db::categories::CategoryRepository;
use crate::error::Result;
use crate::models::category::CategoryWithCount;
use crate::state::AppState;

use super::{ApiSuccess, ok};

/// List all categories with their product counts.
///
/// GET /api/categories
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn index(
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Vec<CategoryWithCount>>>> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;

    Ok(ok(categories))
}
