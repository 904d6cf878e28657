//! Product repository for catalog queries and admin mutations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use kemet_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::product::{CreateProductInput, Product, UpdateProductInput};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    full_description: String,
    price: Decimal,
    stock: i32,
    is_active: bool,
    category_id: i32,
    images: Vec<String>,
    colors: Vec<String>,
    sizes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            full_description: row.full_description,
            price: row.price,
            stock: row.stock,
            is_active: row.is_active,
            category_id: CategoryId::new(row.category_id),
            images: row.images,
            colors: row.colors,
            sizes: row.sizes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, slug, description, full_description, price, stock, \
                               is_active, category_id, images, colors, sizes, created_at, updated_at";

/// Filters for the public catalog listing.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    /// Restrict to a category by its slug.
    pub category_slug: Option<String>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_catalog_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
        builder.push(" WHERE is_active = TRUE");

        if let Some(slug) = &filter.category_slug {
            builder
                .push(" AND category_id IN (SELECT id FROM store.categories WHERE slug = ")
                .push_bind(slug.to_lowercase())
                .push(")");
        }

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// List active products matching the filter, newest first.
    ///
    /// Returns the page of products and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products"
        ));
        Self::push_catalog_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM store.products");
        Self::push_catalog_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        Ok((rows.into_iter().map(Product::from).collect(), total))
    }

    /// Get a single product by slug (active or not).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Batch-resolve active products by ID.
    ///
    /// The result may be smaller than the requested set; callers decide
    /// whether that is an error (checkout rejects the whole order).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products
             WHERE id = ANY($1) AND is_active = TRUE"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Batch-resolve products by ID regardless of active flag.
    ///
    /// Used when rendering carts and historical orders, which may reference
    /// deactivated products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = ANY($1)"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List every product including inactive ones, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a new product (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateProductInput) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO store.products
                 (name, slug, description, full_description, price, stock,
                  is_active, category_id, images, colors, sizes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.full_description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.category_id)
        .bind(&input.images)
        .bind(&input.colors)
        .bind(&input.sizes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "slug already exists"))?;

        Ok(Product::from(row))
    }

    /// Apply a partial update to a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if a new slug collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &UpdateProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut query = QueryBuilder::new("UPDATE store.products SET updated_at = now()");

        if let Some(name) = &input.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(slug) = &input.slug {
            query.push(", slug = ").push_bind(slug);
        }
        if let Some(description) = &input.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(full_description) = &input.full_description {
            query.push(", full_description = ").push_bind(full_description);
        }
        if let Some(price) = input.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(category_id) = input.category_id {
            query.push(", category_id = ").push_bind(category_id);
        }
        if let Some(images) = &input.images {
            query.push(", images = ").push_bind(images);
        }
        if let Some(colors) = &input.colors {
            query.push(", colors = ").push_bind(colors);
        }
        if let Some(sizes) = &input.sizes {
            query.push(", sizes = ").push_bind(sizes);
        }
        if let Some(stock) = input.stock {
            query.push(", stock = ").push_bind(stock);
        }
        if let Some(is_active) = input.is_active {
            query.push(", is_active = ").push_bind(is_active);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(&format!(" RETURNING {PRODUCT_COLUMNS}"));

        let row: Option<ProductRow> = query
            .build_query_as()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "slug already exists"))?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Deactivate a product (admin soft delete).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn deactivate(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE store.products SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
