//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (pings the database)
//!
//! # Catalog (public)
//! GET  /api/products                 - Product listing (category/search/page filters)
//! GET  /api/products/{slug}          - Product detail
//! GET  /api/categories               - Categories with product counts
//!
//! # Auth
//! POST /api/auth/register            - Register a customer account
//! POST /api/auth/login               - Login (starts a session)
//! POST /api/auth/logout              - Logout (clears the session)
//!
//! # Cart (requires auth)
//! GET    /api/cart                   - Cart contents with totals
//! POST   /api/cart                   - Add a (product, tier) line; merges duplicates
//! DELETE /api/cart                   - Clear the cart
//! PUT    /api/cart/{id}              - Update a line's quantity
//! DELETE /api/cart/{id}              - Remove a line
//!
//! # Orders (requires auth)
//! GET  /api/orders                   - Order history
//! POST /api/orders                   - Checkout (transactional order creation)
//! GET  /api/orders/{id}              - Order detail
//!
//! # Account (requires auth)
//! GET  /api/user/profile             - Current profile
//! PUT  /api/user/profile             - Update profile
//! GET  /api/user/addresses           - List addresses
//! POST /api/user/addresses           - Create address
//! PUT  /api/user/addresses/{id}      - Update address
//! DELETE /api/user/addresses/{id}    - Delete address
//!
//! # Admin (requires admin role)
//! GET  /api/admin/products           - All products including inactive
//! POST /api/admin/products           - Create product
//! PUT  /api/admin/products/{id}      - Update product
//! DELETE /api/admin/products/{id}    - Deactivate product (soft delete)
//! GET  /api/admin/orders             - All orders (status filter + pagination)
//! PUT  /api/admin/orders/{id}        - Order status transition
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

use axum::{
    Json,
    Router,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// JSON envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess {
        success: true,
        data,
    })
}

/// Wrap a payload in the success envelope with a 201 status.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiSuccess<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin::products::index).post(admin::products::create),
        )
        .route(
            "/products/{id}",
            put(admin::products::update).delete(admin::products::deactivate),
        )
        .route("/orders", get(admin::orders::index))
        .route("/orders/{id}", put(admin::orders::update_status))
}

/// Create all routes for the storefront API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .route("/api/categories", get(categories::index))
        .nest("/api/auth", auth_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/user", account_routes())
        .nest("/api/admin", admin_routes())
}
