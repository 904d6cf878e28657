//! Checkout: order assembly and placement.
//!
//! Validates the requested lines against the live catalog, prices them with
//! the tier table, computes totals, and hands a fully priced order to the
//! repository's transactional write. Nothing is persisted until every
//! validation has passed, and the write itself is all-or-nothing.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use kemet_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::addresses::AddressRepository;
use crate::db::orders::{NewOrder, NewOrderItem, OrderRepository, OrderWriteError};
use crate::db::products::ProductRepository;
use crate::models::order::{OrderDetail, OrderItemWithProduct, PlaceOrderInput};
use crate::models::product::Product;

use super::pricing;

/// Errors that can occur while assembling an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A shipping or billing address is missing or owned by someone else.
    #[error("Invalid address")]
    InvalidAddress,

    /// Some requested products are missing or inactive.
    #[error("Some products are not available")]
    ProductsUnavailable,

    /// A requested quantity exceeds the product's stock.
    #[error("Insufficient stock for {product}")]
    InsufficientStock { product: String },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Assemble and place an order for a user.
    ///
    /// Steps: resolve both addresses scoped to the user, batch-resolve the
    /// requested products (active only, whole-order rejection on any miss),
    /// validate stock, price each line with its tier, compute totals, then
    /// persist atomically. The user's cart is cleared by the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] describing the first failed validation;
    /// no partial state is ever persisted.
    pub async fn place_order(
        &self,
        user_id: UserId,
        input: &PlaceOrderInput,
    ) -> Result<OrderDetail, CheckoutError> {
        let addresses = AddressRepository::new(self.pool);
        let products_repo = ProductRepository::new(self.pool);
        let orders = OrderRepository::new(self.pool);

        // Both addresses must resolve and belong to the requesting user.
        let shipping_address = addresses
            .get_owned(input.shipping_address_id, user_id)
            .await?
            .ok_or(CheckoutError::InvalidAddress)?;
        let billing_address = addresses
            .get_owned(input.billing_address_id, user_id)
            .await?
            .ok_or(CheckoutError::InvalidAddress)?;

        // Batch-resolve the requested product set, active only.
        let mut requested_ids: Vec<ProductId> =
            input.items.iter().map(|line| line.product_id).collect();
        requested_ids.sort_unstable_by_key(ProductId::as_i32);
        requested_ids.dedup();

        let resolved = products_repo.get_active_by_ids(&requested_ids).await?;
        if resolved.len() != requested_ids.len() {
            return Err(CheckoutError::ProductsUnavailable);
        }

        let products: HashMap<ProductId, Product> =
            resolved.into_iter().map(|p| (p.id, p)).collect();

        // Validate stock and price every line.
        let items = price_lines(&products, input)?;

        let subtotal: Decimal = items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum();
        let totals = pricing::totals_for_subtotal(subtotal).rounded();

        let order = orders
            .create(&NewOrder {
                user_id,
                shipping_address_id: shipping_address.id,
                billing_address_id: billing_address.id,
                subtotal: totals.subtotal,
                tax: totals.tax,
                shipping: totals.shipping,
                total: totals.total,
                notes: input.notes.clone(),
                items,
            })
            .await
            .map_err(|e| match e {
                // A concurrent checkout won the race for the last units.
                OrderWriteError::InsufficientStock { product_id } => {
                    CheckoutError::InsufficientStock {
                        product: products
                            .get(&product_id)
                            .map_or_else(|| product_id.to_string(), |p| p.name.clone()),
                    }
                }
                OrderWriteError::Repository(err) => CheckoutError::Repository(err),
            })?;

        // Assemble the full representation for the response.
        let items = orders.items_for_orders(&[order.id]).await?;
        let items = items
            .into_iter()
            .filter_map(|item| {
                products.get(&item.product_id).map(|product| OrderItemWithProduct {
                    item,
                    product: product.clone(),
                })
            })
            .collect();

        Ok(OrderDetail {
            order,
            items,
            shipping_address,
            billing_address,
        })
    }
}

/// Validate stock and compute the priced lines for an order.
///
/// The first line whose quantity exceeds the product's current stock rejects
/// the whole order, naming the product. Unit prices are the tier-discounted
/// list price, snapshotted to cents.
fn price_lines(
    products: &HashMap<ProductId, Product>,
    input: &PlaceOrderInput,
) -> Result<Vec<NewOrderItem>, CheckoutError> {
    let mut items = Vec::with_capacity(input.items.len());

    for line in &input.items {
        let product = products
            .get(&line.product_id)
            .ok_or(CheckoutError::ProductsUnavailable)?;

        if line.quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product: product.name.clone(),
            });
        }

        items.push(NewOrderItem {
            product_id: product.id,
            quantity: line.quantity,
            tier: line.tier,
            unit_price: line.tier.unit_price(product.price).round_dp(2),
        });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kemet_core::{AddressId, CategoryId, Tier};

    use crate::models::order::OrderLineInput;

    fn product(id: i32, name: &str, price: i64, stock: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: String::new(),
            full_description: String::new(),
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

    fn catalog(products: Vec<Product>) -> HashMap<ProductId, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    fn order(lines: Vec<OrderLineInput>) -> PlaceOrderInput {
        PlaceOrderInput {
            items: lines,
            shipping_address_id: AddressId::new(1),
            billing_address_id: AddressId::new(1),
            notes: None,
        }
    }

    #[test]
    fn test_single_tier_keeps_list_price() {
        let products = catalog(vec![product(1, "Ankh Pendant Shirt", 100, 10)]);
        let items = price_lines(
            &products,
            &order(vec![OrderLineInput {
                product_id: ProductId::new(1),
                quantity: 1,
                tier: Tier::Single,
            }]),
        )
        .expect("order prices");

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|i| i.unit_price), Some(Decimal::from(100)));
    }

    #[test]
    fn test_quarter_tier_discounts_unit_price() {
        let products = catalog(vec![product(1, "Tutankhamun V-Neck Dress", 700, 50)]);
        let items = price_lines(
            &products,
            &order(vec![OrderLineInput {
                product_id: ProductId::new(1),
                quantity: 3,
                tier: Tier::Quarter,
            }]),
        )
        .expect("order prices");

        // 700 at 10% off is 630.00 per unit
        assert_eq!(
            items.first().map(|i| i.unit_price),
            Some(Decimal::new(63000, 2))
        );
    }

    #[test]
    fn test_insufficient_stock_names_product() {
        // stock 2, requested 3
        let products = catalog(vec![product(3, "Scarab Tunic", 250, 2)]);
        let err = price_lines(
            &products,
            &order(vec![OrderLineInput {
                product_id: ProductId::new(3),
                quantity: 3,
                tier: Tier::Single,
            }]),
        )
        .expect_err("must reject");

        match err {
            CheckoutError::InsufficientStock { product } => {
                assert_eq!(product, "Scarab Tunic");
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_product_rejects_order() {
        let products = catalog(vec![]);
        let err = price_lines(
            &products,
            &order(vec![OrderLineInput {
                product_id: ProductId::new(9),
                quantity: 1,
                tier: Tier::Single,
            }]),
        )
        .expect_err("must reject");
        assert!(matches!(err, CheckoutError::ProductsUnavailable));
    }

    #[test]
    fn test_subtotal_accumulates_discounted_lines() {
        let products = catalog(vec![
            product(1, "Nefertiti Belted Robe", 700, 50),
            product(2, "Horus Falcon Long Shirt", 700, 60),
        ]);
        let items = price_lines(
            &products,
            &order(vec![
                OrderLineInput {
                    product_id: ProductId::new(1),
                    quantity: 3,
                    tier: Tier::Quarter,
                },
                OrderLineInput {
                    product_id: ProductId::new(2),
                    quantity: 12,
                    tier: Tier::Full,
                },
            ]),
        )
        .expect("order prices");

        let subtotal: Decimal = items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum();
        // 3 * 630 + 12 * 560 = 1890 + 6720 = 8610
        assert_eq!(subtotal, Decimal::new(861_000, 2));

        let totals = pricing::totals_for_subtotal(subtotal).rounded();
        assert_eq!(totals.tax, Decimal::new(86_100, 2)); // 861.00
        assert_eq!(totals.shipping, Decimal::ZERO); // above the threshold
        assert_eq!(totals.total, Decimal::new(947_100, 2)); // 9471.00
    }
}
