//! Cart repository.
//!
//! Cart lines are scoped per user and unique per (user, product, tier);
//! re-adding the same pair merges quantities via an upsert on that key.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;

use kemet_core::{CartLineId, ProductId, Tier, UserId};

use super::RepositoryError;
use crate::models::cart::CartLine;

/// Internal row type for cart line queries.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    tier: String,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let tier = Tier::from_str(&row.tier).map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: CartLineId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            tier,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CART_COLUMNS: &str = "id, user_id, product_id, tier, quantity, created_at, updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored tier is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(&format!(
            "SELECT {CART_COLUMNS} FROM store.cart_items
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Get one cart line, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: CartLineId,
        user_id: UserId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row: Option<CartLineRow> = sqlx::query_as(&format!(
            "SELECT {CART_COLUMNS} FROM store.cart_items WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Add units of a (product, tier) pair to the cart.
    ///
    /// An existing line for the same pair absorbs the quantity; otherwise a
    /// new line is created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tier: Tier,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let row: CartLineRow = sqlx::query_as(&format!(
            "INSERT INTO store.cart_items (user_id, product_id, tier, quantity)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, product_id, tier)
             DO UPDATE SET quantity = store.cart_items.quantity + EXCLUDED.quantity,
                           updated_at = now()
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(tier.to_string())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        CartLine::try_from(row)
    }

    /// Set a cart line's quantity, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist or is
    /// owned by someone else.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        id: CartLineId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let row: Option<CartLineRow> = sqlx::query_as(&format!(
            "UPDATE store.cart_items
             SET quantity = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {CART_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), CartLine::try_from)
    }

    /// Remove one cart line, scoped to its owner.
    ///
    /// Returns `true` if a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, id: CartLineId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.cart_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all of a user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
