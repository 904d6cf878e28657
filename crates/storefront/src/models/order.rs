//! Order domain types and checkout inputs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kemet_core::{AddressId, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, Tier, UserId};

use super::address::Address;
use super::product::Product;

/// An order header.
///
/// Money columns are computed once at creation from the pricing rules in
/// force at that moment and are never recomputed; `total` always equals
/// `subtotal + tax + shipping`.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable, externally displayed identifier (`ORD-NNNNNN`),
    /// distinct from the internal row id.
    pub order_number: String,
    pub user_id: UserId,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A snapshotted order line.
///
/// `unit_price` is the tier-discounted per-unit price at order time;
/// later catalog price changes never affect it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub tier: Tier,
    pub unit_price: Decimal,
}

/// An order item joined with its (possibly deactivated) product.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemWithProduct {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Product,
}

/// A full order as returned to its owner: header, items, and addresses.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemWithProduct>,
    pub shipping_address: Address,
    pub billing_address: Address,
}

/// Minimal customer info attached to admin order listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCustomer {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
}

/// An order as listed in the admin panel.
#[derive(Debug, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer: OrderCustomer,
}

/// One requested line in a checkout payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: i32,
    pub tier: Tier,
}

/// Checkout request body.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderInput {
    pub items: Vec<OrderLineInput>,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub notes: Option<String>,
}

impl PlaceOrderInput {
    /// Validate field-level constraints before touching the database.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("Order must contain at least one item".to_string());
        }
        if self.items.iter().any(|line| line.quantity <= 0) {
            return Err("Quantity must be positive".to_string());
        }
        Ok(())
    }
}

/// Admin request to move an order through its status machine.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(lines: Vec<OrderLineInput>) -> PlaceOrderInput {
        PlaceOrderInput {
            items: lines,
            shipping_address_id: AddressId::new(1),
            billing_address_id: AddressId::new(1),
            notes: None,
        }
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(input(vec![]).validate().is_err());
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let bad = input(vec![OrderLineInput {
            product_id: ProductId::new(1),
            quantity: 0,
            tier: Tier::Single,
        }]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_valid_order_accepted() {
        let ok = input(vec![OrderLineInput {
            product_id: ProductId::new(1),
            quantity: 3,
            tier: Tier::Quarter,
        }]);
        assert!(ok.validate().is_ok());
    }
}
