//! Order route handlers: history, detail, and checkout.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use kemet_core::{OrderId, ProductId};

use crate::db::addresses::AddressRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::{Order, OrderDetail, OrderItemWithProduct, PlaceOrderInput};
use crate::models::product::Product;
use crate::models::session::CurrentUser;
use crate::services::CheckoutService;
use crate::state::AppState;

use super::{ApiSuccess, ok};

/// Expand order headers into full details (items, products, addresses).
async fn expand_orders(
    state: &AppState,
    user: &CurrentUser,
    orders: Vec<Order>,
) -> Result<Vec<OrderDetail>> {
    let order_repo = OrderRepository::new(state.pool());
    let address_repo = AddressRepository::new(state.pool());

    let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<OrderId, Vec<_>> = HashMap::new();
    for item in order_repo.items_for_orders(&order_ids).await? {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    // Historical orders may reference deactivated products
    let mut product_ids: Vec<ProductId> = items_by_order
        .values()
        .flatten()
        .map(|item| item.product_id)
        .collect();
    product_ids.sort_unstable_by_key(ProductId::as_i32);
    product_ids.dedup();
    let products: HashMap<ProductId, Product> = ProductRepository::new(state.pool())
        .get_by_ids(&product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let addresses: HashMap<_, _> = address_repo
        .list_for_user(user.id)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    orders
        .into_iter()
        .map(|order| {
            let items = items_by_order
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|item| {
                    let product = products.get(&item.product_id).cloned().ok_or_else(|| {
                        AppError::Internal(format!(
                            "order item references missing product {}",
                            item.product_id
                        ))
                    })?;
                    Ok(OrderItemWithProduct { item, product })
                })
                .collect::<Result<Vec<_>>>()?;

            let shipping_address = addresses
                .get(&order.shipping_address_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Internal("order references missing shipping address".to_string())
                })?;
            let billing_address = addresses
                .get(&order.billing_address_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Internal("order references missing billing address".to_string())
                })?;

            Ok(OrderDetail {
                order,
                items,
                shipping_address,
                billing_address,
            })
        })
        .collect()
}

/// List the user's orders, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiSuccess<Vec<OrderDetail>>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let details = expand_orders(&state, &user, orders).await?;

    Ok(ok(details))
}

/// Place an order (checkout).
///
/// POST /api/orders
///
/// Creates the order, decrements stock, and clears the cart as one atomic
/// unit; any rejection leaves no trace.
///
/// # Errors
///
/// Returns `AppError::Validation` for empty/malformed payloads and
/// `AppError::Checkout` for business-rule rejections (bad address,
/// unavailable products, insufficient stock).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<PlaceOrderInput>,
) -> Result<(StatusCode, Json<ApiSuccess<OrderDetail>>)> {
    input.validate().map_err(AppError::Validation)?;

    let detail = CheckoutService::new(state.pool())
        .place_order(user.id, &input)
        .await?;

    tracing::info!(
        user_id = %user.id,
        order_number = %detail.order.order_number,
        total = %detail.order.total,
        "order placed"
    );

    Ok(super::created(detail))
}

/// Get one of the user's orders.
///
/// GET /api/orders/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order doesn't exist or belongs to
/// another user.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ApiSuccess<OrderDetail>>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(OrderId::new(id), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let mut details = expand_orders(&state, &user, vec![order]).await?;
    let detail = details
        .pop()
        .ok_or_else(|| AppError::Internal("order vanished during lookup".to_string()))?;

    Ok(ok(detail))
}
