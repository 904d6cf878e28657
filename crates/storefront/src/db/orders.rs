//! Order repository.
//!
//! Order creation is the one multi-step write in the system and runs as a
//! single transaction: header insert, line-item inserts, conditional stock
//! decrements, and the cart clear either all commit or all roll back. The
//! stock decrement carries its own `stock >= n` guard so two concurrent
//! checkouts can never drive stock negative; the loser rolls back with an
//! insufficient-stock error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use thiserror::Error;

use kemet_core::{AddressId, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, Tier, UserId};

use super::RepositoryError;
use crate::models::order::{AdminOrder, Order, OrderCustomer, OrderItem};

/// Errors from the transactional order write.
#[derive(Debug, Error)]
pub enum OrderWriteError {
    /// Underlying repository/database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A stock decrement found fewer units than requested. The transaction
    /// has been rolled back; nothing was persisted.
    #[error("insufficient stock for product {product_id}")]
    InsufficientStock { product_id: ProductId },
}

impl From<sqlx::Error> for OrderWriteError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// A fully priced order ready to persist.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// One priced line of a [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub tier: Tier,
    /// Tier-discounted per-unit price snapshot.
    pub unit_price: Decimal,
}

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    shipping_address_id: i32,
    billing_address_id: i32,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    status: String,
    payment_status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status).map_err(RepositoryError::DataCorruption)?;
        let payment_status =
            PaymentStatus::from_str(&row.payment_status).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            user_id: UserId::new(row.user_id),
            shipping_address_id: AddressId::new(row.shipping_address_id),
            billing_address_id: AddressId::new(row.billing_address_id),
            subtotal: row.subtotal,
            tax: row.tax,
            shipping: row.shipping,
            total: row.total,
            status,
            payment_status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    tier: String,
    unit_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let tier = Tier::from_str(&row.tier).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            tier,
            unit_price: row.unit_price,
        })
    }
}

/// Internal row type for admin order listings (order + customer).
#[derive(Debug, sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_email: String,
    customer_name: Option<String>,
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, shipping_address_id, billing_address_id, \
                             subtotal, tax, shipping, total, status, payment_status, notes, \
                             created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order atomically.
    ///
    /// Inserts the header and line items, decrements each product's stock
    /// (guarded: `stock >= quantity`), and clears the user's cart, all in one
    /// transaction. The order number comes from a dedicated sequence, so it
    /// is strictly monotonic and collision-free.
    ///
    /// # Errors
    ///
    /// Returns `OrderWriteError::InsufficientStock` when a guard fails (the
    /// whole transaction rolls back), or `OrderWriteError::Repository` for
    /// database failures.
    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, OrderWriteError> {
        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('store.order_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let order_number = format!("ORD-{sequence:06}");

        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO store.orders
                 (order_number, user_id, shipping_address_id, billing_address_id,
                  subtotal, tax, shipping, total, status, payment_status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order_number)
        .bind(new_order.user_id)
        .bind(new_order.shipping_address_id)
        .bind(new_order.billing_address_id)
        .bind(new_order.subtotal)
        .bind(new_order.tax)
        .bind(new_order.shipping)
        .bind(new_order.total)
        .bind(OrderStatus::Pending.to_string())
        .bind(PaymentStatus::Pending.to_string())
        .bind(new_order.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for item in &new_order.items {
            sqlx::query(
                "INSERT INTO store.order_items (order_id, product_id, quantity, tier, unit_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.tier.to_string())
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;

            // Guarded decrement: losing a stock race aborts the whole order.
            let result = sqlx::query(
                "UPDATE store.products
                 SET stock = stock - $1, updated_at = now()
                 WHERE id = $2 AND stock >= $1",
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(OrderWriteError::InsufficientStock {
                    product_id: item.product_id,
                });
            }
        }

        sqlx::query("DELETE FROM store.cart_items WHERE user_id = $1")
            .bind(new_order.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Order::try_from(row)?)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Get one order, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Get one order by ID (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// List items for a set of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored tier is invalid.
    pub async fn items_for_orders(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let raw_ids: Vec<i32> = order_ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, tier, unit_price
             FROM store.order_items
             WHERE order_id = ANY($1)
             ORDER BY id ASC",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    /// List all orders with customer info (admin), newest first.
    ///
    /// Returns the page of orders and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AdminOrder>, i64), RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT o.id, o.order_number, o.user_id, o.shipping_address_id,
                    o.billing_address_id, o.subtotal, o.tax, o.shipping, o.total,
                    o.status, o.payment_status, o.notes, o.created_at, o.updated_at,
                    u.email AS customer_email, u.name AS customer_name
             FROM store.orders o
             JOIN store.users u ON u.id = o.user_id",
        );
        if let Some(status) = status {
            query.push(" WHERE o.status = ").push_bind(status.to_string());
        }
        query
            .push(" ORDER BY o.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<AdminOrderRow> = query.build_query_as().fetch_all(self.pool).await?;

        let mut count: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM store.orders");
        if let Some(status) = status {
            count.push(" WHERE status = ").push_bind(status.to_string());
        }
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let orders = rows
            .into_iter()
            .map(|row| {
                let customer = OrderCustomer {
                    id: UserId::new(row.order.user_id),
                    email: row.customer_email,
                    name: row.customer_name,
                };
                Ok(AdminOrder {
                    order: Order::try_from(row.order)?,
                    customer,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok((orders, total))
    }

    /// Move an order from `expected` to `next` (admin).
    ///
    /// The update is conditional on the current status so a concurrent
    /// transition cannot be silently overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order's status no longer
    /// matches `expected`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE store.orders
             SET status = $3, updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(expected.to_string())
        .bind(next.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map_or(
            Err(RepositoryError::Conflict(
                "order status changed concurrently".to_string(),
            )),
            Order::try_from,
        )
    }
}
