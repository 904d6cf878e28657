//! Address repository.
//!
//! Every query is scoped to the owning user; another user's address behaves
//! exactly like a missing one. The default flag is maintained by unsetting
//! the previous default inside the same transaction as the new write, and
//! the schema backs the invariant with a partial unique index.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use kemet_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{Address, CreateAddressInput, UpdateAddressInput};

/// Internal row type for address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    name: String,
    street: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    phone: String,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            street: row.street,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            phone: row.phone,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ADDRESS_COLUMNS: &str = "id, user_id, name, street, city, state, postal_code, country, \
                               phone, is_default, created_at, updated_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows: Vec<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM store.addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    /// Get one address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM store.addresses WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    /// Create an address for a user.
    ///
    /// When the new address is flagged default, the user's previous default
    /// is unset in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &CreateAddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query(
                "UPDATE store.addresses SET is_default = FALSE, updated_at = now()
                 WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let row: AddressRow = sqlx::query_as(&format!(
            "INSERT INTO store.addresses
                 (user_id, name, street, city, state, postal_code, country, phone, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.street)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Address::from(row))
    }

    /// Apply a partial update to an address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or is
    /// owned by someone else.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        input: &UpdateAddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default == Some(true) {
            sqlx::query(
                "UPDATE store.addresses SET is_default = FALSE, updated_at = now()
                 WHERE user_id = $1 AND is_default AND id <> $2",
            )
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE store.addresses SET updated_at = now()");

        if let Some(name) = &input.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(street) = &input.street {
            query.push(", street = ").push_bind(street);
        }
        if let Some(city) = &input.city {
            query.push(", city = ").push_bind(city);
        }
        if let Some(state) = &input.state {
            query.push(", state = ").push_bind(state);
        }
        if let Some(postal_code) = &input.postal_code {
            query.push(", postal_code = ").push_bind(postal_code);
        }
        if let Some(country) = &input.country {
            query.push(", country = ").push_bind(country);
        }
        if let Some(phone) = &input.phone {
            query.push(", phone = ").push_bind(phone);
        }
        if let Some(is_default) = input.is_default {
            query.push(", is_default = ").push_bind(is_default);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(&format!(" RETURNING {ADDRESS_COLUMNS}"));

        let row: Option<AddressRow> = query.build_query_as().fetch_optional(&mut *tx).await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;

        Ok(Address::from(row))
    }

    /// Delete an address, scoped to its owner.
    ///
    /// Returns `true` if an address was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the address is still
    /// referenced by orders (historical orders keep their addresses).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store.addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "address is referenced by existing orders".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
