//! Core types for Kemet.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;
pub mod tier;

pub use email::{Email, EmailError};
pub use id::{AddressId, CartLineId, CategoryId, OrderId, OrderItemId, ProductId, UserId};
pub use status::{OrderStatus, PaymentStatus, UserRole};
pub use tier::Tier;
