//! Address domain types and inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kemet_core::{AddressId, UserId};

/// A user's shipping or billing address.
///
/// At most one address per user carries the default flag; the repository
/// enforces this inside a transaction and the schema backs it with a partial
/// unique index.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    /// Recipient name.
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an address.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressInput {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl CreateAddressInput {
    /// Validate field-level constraints.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().len() < 2 {
            return Err("Name must be at least 2 characters".to_string());
        }
        if self.street.trim().len() < 5 {
            return Err("Street address is required".to_string());
        }
        if self.city.trim().len() < 2 {
            return Err("City is required".to_string());
        }
        if self.state.trim().len() < 2 {
            return Err("State is required".to_string());
        }
        if self.postal_code.trim().len() < 3 {
            return Err("Postal code is required".to_string());
        }
        if self.country.trim().len() < 2 {
            return Err("Country is required".to_string());
        }
        if self.phone.trim().len() < 10 {
            return Err("Valid phone number is required".to_string());
        }
        Ok(())
    }
}

/// Partial update for an address. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAddressInput {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateAddressInput {
        CreateAddressInput {
            name: "Amara Hassan".to_string(),
            street: "14 Corniche El Nil".to_string(),
            city: "Cairo".to_string(),
            state: "Cairo".to_string(),
            postal_code: "11511".to_string(),
            country: "Egypt".to_string(),
            phone: "+20100123456".to_string(),
            is_default: false,
        }
    }

    #[test]
    fn test_valid_address() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut input = valid_input();
        input.phone = "12345".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_short_street_rejected() {
        let mut input = valid_input();
        input.street = "x".to_string();
        assert!(input.validate().is_err());
    }
}
