//! Admin route handlers.
//!
//! All handlers here take the `RequireAdmin` extractor: an unauthenticated
//! caller gets a 401, an authenticated customer a 403.

pub mod orders;
pub mod products;
