//! Cart route handlers.
//!
//! The cart is per-user server state: lines are unique per (user, product,
//! tier) and merge on repeated adds. Checkout clears it transactionally.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use kemet_core::{CartLineId, ProductId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::cart::{AddToCartInput, CartLineWithProduct, CartView, UpdateCartLineInput};
use crate::models::product::Product;
use crate::state::AppState;

use super::{ApiSuccess, ok};

/// Attach products to a set of cart lines.
async fn with_products(
    state: &AppState,
    lines: Vec<crate::models::cart::CartLine>,
) -> Result<Vec<CartLineWithProduct>> {
    let mut product_ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
    product_ids.sort_unstable_by_key(ProductId::as_i32);
    product_ids.dedup();

    // Carts may reference products deactivated after they were added
    let products: HashMap<ProductId, Product> = ProductRepository::new(state.pool())
        .get_by_ids(&product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    lines
        .into_iter()
        .map(|line| {
            let product = products.get(&line.product_id).cloned().ok_or_else(|| {
                AppError::Internal(format!(
                    "cart line {} references missing product {}",
                    line.id, line.product_id
                ))
            })?;
            Ok(CartLineWithProduct { line, product })
        })
        .collect()
}

/// Get the user's cart with totals.
///
/// GET /api/cart
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiSuccess<CartView>>> {
    let lines = CartRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let items = with_products(&state, lines).await?;

    Ok(ok(CartView::new(items)))
}

/// Add a (product, tier) line to the cart, merging with an existing line.
///
/// POST /api/cart
///
/// # Errors
///
/// Returns `AppError::Validation` for non-positive quantities or
/// insufficient stock, `AppError::NotFound` for unknown or inactive
/// products.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<AddToCartInput>,
) -> Result<(StatusCode, Json<ApiSuccess<CartLineWithProduct>>)> {
    if input.quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be positive".to_string(),
        ));
    }

    // Product must exist and be active
    let product = ProductRepository::new(state.pool())
        .get_by_id(input.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Product not found or not available".to_string()))?;

    // Checked here, enforced again by the checkout transaction
    if product.stock < input.quantity {
        return Err(AppError::Validation("Insufficient stock".to_string()));
    }

    let line = CartRepository::new(state.pool())
        .add(user.id, input.product_id, input.tier, input.quantity)
        .await?;

    Ok(super::created(CartLineWithProduct { line, product }))
}

/// Update a cart line's quantity.
///
/// PUT /api/cart/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the line doesn't exist or belongs to
/// another user; `AppError::Validation` for bad quantities or insufficient
/// stock.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(input): Json<UpdateCartLineInput>,
) -> Result<Json<ApiSuccess<CartLineWithProduct>>> {
    if input.quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be positive".to_string(),
        ));
    }

    let carts = CartRepository::new(state.pool());
    let id = CartLineId::new(id);

    let existing = carts
        .get_for_user(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(existing.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if product.stock < input.quantity {
        return Err(AppError::Validation("Insufficient stock".to_string()));
    }

    let line = carts.set_quantity(id, user.id, input.quantity).await?;

    Ok(ok(CartLineWithProduct { line, product }))
}

/// Remove one cart line.
///
/// DELETE /api/cart/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the line doesn't exist or belongs to
/// another user.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ApiSuccess<Value>>> {
    let removed = CartRepository::new(state.pool())
        .remove(CartLineId::new(id), user.id)
        .await?;

    if !removed {
        return Err(AppError::NotFound("Cart item not found".to_string()));
    }

    Ok(ok(json!({ "message": "Item removed from cart" })))
}

/// Clear the user's cart.
///
/// DELETE /api/cart
///
/// # Errors
///
/// Returns `AppError::Database` if the delete fails.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiSuccess<Value>>> {
    CartRepository::new(state.pool()).clear(user.id).await?;

    Ok(ok(json!({ "message": "Cart cleared successfully" })))
}
