//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kemet_core::{CartLineId, ProductId, Tier, UserId};

use super::product::Product;

/// One line in a user's cart: a (product, tier) pair with a unit quantity.
///
/// Unique per (user, product, tier); adding the same pair again merges by
/// summing quantities.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub tier: Tier,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with its product.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineWithProduct {
    #[serde(flatten)]
    pub line: CartLine,
    pub product: Product,
}

impl CartLineWithProduct {
    /// Tier-discounted per-unit price for this line.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.line.tier.unit_price(self.product.price)
    }

    /// Line total: discounted unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.line.quantity)
    }
}

/// The full cart view returned by `GET /api/cart`.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineWithProduct>,
    pub total_items: i64,
    pub total_price: Decimal,
}

impl CartView {
    /// Assemble the view, accumulating totals in exact decimal arithmetic.
    #[must_use]
    pub fn new(items: Vec<CartLineWithProduct>) -> Self {
        let total_items = items.iter().map(|i| i64::from(i.line.quantity)).sum();
        let total_price = items.iter().map(CartLineWithProduct::line_total).sum();
        Self {
            items,
            total_items,
            total_price,
        }
    }
}

/// Request body for adding to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartInput {
    pub product_id: ProductId,
    pub quantity: i32,
    pub tier: Tier,
}

/// Request body for updating a cart line's quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCartLineInput {
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kemet_core::CategoryId;

    fn product(price: i64, stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Nefertiti Belted Robe".to_string(),
            slug: "nefertiti-belted-robe".to_string(),
            description: "Beige fabric with blue accents".to_string(),
            full_description: "Beige fabric with blue accents".to_string(),
            price: Decimal::from(price),
            stock,
            is_active: true,
            category_id: CategoryId::new(1),
            images: vec![],
            colors: vec![],
            sizes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(tier: Tier, quantity: i32, price: i64) -> CartLineWithProduct {
        CartLineWithProduct {
            line: CartLine {
                id: CartLineId::new(1),
                user_id: UserId::new(1),
                product_id: ProductId::new(1),
                tier,
                quantity,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            product: product(price, 100),
        }
    }

    #[test]
    fn test_line_total_applies_tier_discount() {
        // 700 at the quarter tier is 630/unit; 3 units total 1890
        let l = line(Tier::Quarter, 3, 700);
        assert_eq!(l.unit_price(), Decimal::new(63000, 2));
        assert_eq!(l.line_total(), Decimal::new(189_000, 2));
    }

    #[test]
    fn test_cart_view_totals() {
        let view = CartView::new(vec![line(Tier::Single, 2, 100), line(Tier::Quarter, 3, 700)]);
        assert_eq!(view.total_items, 5);
        // 2 * 100 + 3 * 630 = 2090
        assert_eq!(view.total_price, Decimal::new(209_000, 2));
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(vec![]);
        assert_eq!(view.total_items, 0);
        assert_eq!(view.total_price, Decimal::ZERO);
    }
}
