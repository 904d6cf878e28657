//! Public catalog route handlers.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use kemet_core::CategoryId;

use crate::db::categories::CategoryRepository;
use crate::db::products::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::category::Category;
use crate::models::product::ProductWithCategory;
use crate::models::{Page, Pagination};
use crate::state::AppState;

use super::{ApiSuccess, ok};

const DEFAULT_PAGE_SIZE: u32 = 12;
const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for the catalog listing.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Resolve categories for a set of products and zip them together.
async fn with_categories(
    state: &AppState,
    products: Vec<crate::models::product::Product>,
) -> Result<Vec<ProductWithCategory>> {
    let mut category_ids: Vec<CategoryId> = products.iter().map(|p| p.category_id).collect();
    category_ids.sort_unstable_by_key(CategoryId::as_i32);
    category_ids.dedup();

    let categories: HashMap<CategoryId, Category> = CategoryRepository::new(state.pool())
        .get_by_ids(&category_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    products
        .into_iter()
        .map(|product| {
            let category = categories
                .get(&product.category_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "product {} references missing category {}",
                        product.id, product.category_id
                    ))
                })?;
            Ok(ProductWithCategory { product, category })
        })
        .collect()
}

/// List active products.
///
/// GET /api/products?category=&search=&page=&limit=
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ApiSuccess<Page<ProductWithCategory>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = ProductFilter {
        // "All" is the client's sentinel for no category filter
        category_slug: query.category.filter(|c| c.as_str() != "All"),
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let pagination = Pagination::new(page, limit, 0);
    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, i64::from(limit), pagination.offset())
        .await?;

    let items = with_categories(&state, products).await?;

    Ok(ok(Page {
        items,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// Get a single active product by slug.
///
/// GET /api/products/{slug}
///
/// # Errors
///
/// Returns `AppError::NotFound` if the slug doesn't resolve to an active
/// product.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiSuccess<ProductWithCategory>>> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let mut items = with_categories(&state, vec![product]).await?;
    let item = items
        .pop()
        .ok_or_else(|| AppError::Internal("product vanished during lookup".to_string()))?;

    Ok(ok(item))
}
