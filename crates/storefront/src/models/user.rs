//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kemet_core::{Email, UserId, UserRole};

/// A storefront user (domain type).
///
/// The password hash never appears here; it stays inside the repository
/// layer and the auth service.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Optional display name.
    pub name: Option<String>,
    /// Role gating admin-only operations.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
