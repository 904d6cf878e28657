//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Tables (schema `store`)
//!
//! - `users` - Credential holders with a role (customer/admin)
//! - `categories` - Product categories
//! - `products` - The catalog (soft-deleted via `is_active`)
//! - `cart_items` - Per-user cart lines, unique per (user, product, tier)
//! - `addresses` - User shipping/billing addresses
//! - `orders` / `order_items` - Order headers and price-snapshotted lines
//! - Session storage is managed by tower-sessions-sqlx-store
//!
//! # Repositories
//!
//! Each repository borrows the pool and converts `sqlx::FromRow` row structs
//! into domain models at its boundary. Queries use the runtime API, so the
//! workspace builds without a live database.
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p kemet-cli -- migrate
//! ```

pub mod addresses;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_sqlx(err: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_msg.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool without connecting eagerly.
///
/// Used by tests that exercise the HTTP surface that never reaches the
/// database (auth gating, validation rejections).
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection URL is malformed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(3))
        .connect_lazy(database_url.expose_secret())
}
