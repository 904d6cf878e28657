//! Admin order management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use kemet_core::{OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::order::{AdminOrder, Order, UpdateOrderStatusInput};
use crate::models::{Page, Pagination};
use crate::state::AppState;

use crate::routes::{ApiSuccess, ok};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for the admin order listing.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// List all orders with customer info, newest first.
///
/// GET /api/admin/orders?status=&page=&limit=
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiSuccess<Page<AdminOrder>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let pagination = Pagination::new(page, limit, 0);
    let (orders, total) = OrderRepository::new(state.pool())
        .list_all(query.status, i64::from(limit), pagination.offset())
        .await?;

    Ok(ok(Page {
        items: orders,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Move an order through its status machine.
///
/// PUT /api/admin/orders/{id}
///
/// Allowed transitions: PENDING → PROCESSING → SHIPPED → DELIVERED, with
/// CANCELLED reachable from any non-terminal state. Anything else is a
/// validation failure.
///
/// # Errors
///
/// Returns `AppError::NotFound` for unknown orders and
/// `AppError::Validation` for illegal transitions.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(input): Json<UpdateOrderStatusInput>,
) -> Result<Json<ApiSuccess<Order>>> {
    let orders = OrderRepository::new(state.pool());
    let id = OrderId::new(id);

    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if !order.status.can_transition_to(input.status) {
        return Err(AppError::Validation(format!(
            "Cannot transition order from {} to {}",
            order.status, input.status
        )));
    }

    let updated = orders.update_status(id, order.status, input.status).await?;

    tracing::info!(
        admin = %admin.id,
        order_number = %updated.order_number,
        from = %order.status,
        to = %updated.status,
        "order status updated"
    );

    Ok(ok(updated))
}
