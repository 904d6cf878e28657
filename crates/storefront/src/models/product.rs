//! Product domain types and catalog mutation inputs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kemet_core::{CategoryId, ProductId};

use super::category::Category;

/// A catalog product.
///
/// Deactivated products (`is_active == false`) are excluded from the public
/// catalog and from ordering but are never hard-deleted: historical orders
/// keep referencing them.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// URL-safe unique handle.
    pub slug: String,
    /// Short description shown in listings.
    pub description: String,
    /// Long-form description for the product page.
    pub full_description: String,
    /// Per-unit list price before any tier discount.
    pub price: Decimal,
    /// Units on hand. Never negative.
    pub stock: i32,
    pub is_active: bool,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product joined with its category, as returned by catalog endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

/// Input for creating a product (admin).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub full_description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl CreateProductInput {
    /// Validate field-level constraints.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.slug.trim().is_empty() {
            return Err("Slug is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        if self.full_description.trim().is_empty() {
            return Err("Full description is required".to_string());
        }
        if self.price <= Decimal::ZERO {
            return Err("Price must be positive".to_string());
        }
        if self.stock < 0 {
            return Err("Stock cannot be negative".to_string());
        }
        if self.images.is_empty() {
            return Err("At least one image is required".to_string());
        }
        Ok(())
    }
}

/// Partial update for a product (admin). Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateProductInput {
    /// Validate field-level constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("Product name is required".to_string());
        }
        if let Some(slug) = &self.slug
            && slug.trim().is_empty()
        {
            return Err("Slug is required".to_string());
        }
        if let Some(price) = self.price
            && price <= Decimal::ZERO
        {
            return Err("Price must be positive".to_string());
        }
        if let Some(stock) = self.stock
            && stock < 0
        {
            return Err("Stock cannot be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateProductInput {
        CreateProductInput {
            name: "Tutankhamun V-Neck Dress".to_string(),
            slug: "tutankhamun-v-neck-dress".to_string(),
            description: "Long sleeves, teal fabric".to_string(),
            full_description: "Long sleeves, teal fabric with golden mask print".to_string(),
            price: Decimal::from(700),
            category_id: CategoryId::new(1),
            images: vec!["https://cdn.example.com/dress.jpg".to_string()],
            colors: vec!["Teal".to_string()],
            sizes: vec!["M".to_string()],
            stock: 50,
            is_active: true,
        }
    }

    #[test]
    fn test_create_valid() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_create_rejects_non_positive_price() {
        let mut input = valid_input();
        input.price = Decimal::ZERO;
        assert!(input.validate().is_err());
        input.price = Decimal::from(-5);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_rejects_negative_stock() {
        let mut input = valid_input();
        input.stock = -1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut input = valid_input();
        input.name = "  ".to_string();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        let update = UpdateProductInput {
            stock: Some(10),
            ..UpdateProductInput::default()
        };
        assert!(update.validate().is_ok());

        let update = UpdateProductInput {
            price: Some(Decimal::ZERO),
            ..UpdateProductInput::default()
        };
        assert!(update.validate().is_err());
    }
}
