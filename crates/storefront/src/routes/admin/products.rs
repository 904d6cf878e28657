//! Admin product management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use kemet_core::{CategoryId, ProductId};

use crate::db::categories::CategoryRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{CreateProductInput, Product, UpdateProductInput};
use crate::state::AppState;

use crate::routes::{ApiSuccess, ok};

/// List every product including inactive ones.
///
/// GET /api/admin/products
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiSuccess<Vec<Product>>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(ok(products))
}

/// Check that a category id resolves before writing a product against it.
async fn ensure_category_exists(state: &AppState, id: CategoryId) -> Result<()> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation("Invalid category ID".to_string()))
}

/// Create a product.
///
/// POST /api/admin/products
///
/// # Errors
///
/// Returns `AppError::Validation` for field violations and
/// `AppError::Database` with a conflict for duplicate slugs.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateProductInput>,
) -> Result<(StatusCode, Json<ApiSuccess<Product>>)> {
    input.validate().map_err(AppError::Validation)?;
    ensure_category_exists(&state, input.category_id).await?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(admin = %admin.id, product = %product.id, slug = %product.slug, "product created");

    Ok(crate::routes::created(product))
}

/// Apply a partial update to a product.
///
/// PUT /api/admin/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown products and
/// `AppError::Validation` for field violations.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<ApiSuccess<Product>>> {
    input.validate().map_err(AppError::Validation)?;
    if let Some(category_id) = input.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_string())
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(admin = %admin.id, product = %product.id, "product updated");

    Ok(ok(product))
}

/// Deactivate a product (soft delete).
///
/// DELETE /api/admin/products/{id}
///
/// The product stays in the database for historical orders; it simply
/// disappears from the catalog and can no longer be ordered.
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown products.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ApiSuccess<Value>>> {
    ProductRepository::new(state.pool())
        .deactivate(ProductId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_string())
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(admin = %admin.id, product = id, "product deactivated");

    Ok(ok(json!({ "message": "Product deactivated successfully" })))
}
