//! Order-total arithmetic.
//!
//! Pure functions over `Decimal`: flat 10% tax, a flat shipping fee waived
//! once the subtotal exceeds the free-shipping threshold. Accumulation is
//! exact; rounding to cents happens once, when totals are persisted.

use rust_decimal::Decimal;
use serde::Serialize;

/// Flat tax rate applied to every order subtotal.
// 0.10 == mantissa 10, scale 2 (equivalent to `Decimal::new(10, 2)`)
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Flat shipping fee below the free-shipping threshold.
// 50 == mantissa 50, scale 0 (equivalent to `Decimal::new(50, 0)`)
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Subtotals strictly above this ship free.
// 1000 == mantissa 1000, scale 0 (equivalent to `Decimal::new(1000, 0)`)
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Computed money columns for an order.
///
/// Invariant: `total == subtotal + tax + shipping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Compute tax, shipping, and the grand total for a subtotal.
#[must_use]
pub fn totals_for_subtotal(subtotal: Decimal) -> OrderTotals {
    let tax = subtotal * TAX_RATE;
    let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    };
    let total = subtotal + tax + shipping;

    OrderTotals {
        subtotal,
        tax,
        shipping,
        total,
    }
}

impl OrderTotals {
    /// Round every column to cents for persistence/display.
    ///
    /// The total is re-derived from the rounded components so the stored
    /// columns always satisfy `total == subtotal + tax + shipping`.
    #[must_use]
    pub fn rounded(self) -> Self {
        let subtotal = self.subtotal.round_dp(2);
        let tax = self.tax.round_dp(2);
        let shipping = self.shipping.round_dp(2);
        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_pays_flat_shipping() {
        // subtotal 100 -> tax 10, shipping 50, total 160
        let totals = totals_for_subtotal(Decimal::from(100));
        assert_eq!(totals.tax, Decimal::from(10));
        assert_eq!(totals.shipping, Decimal::from(50));
        assert_eq!(totals.total, Decimal::from(160));
    }

    #[test]
    fn test_above_threshold_ships_free() {
        // subtotal 1200 -> tax 120, shipping 0, total 1320
        let totals = totals_for_subtotal(Decimal::from(1200));
        assert_eq!(totals.tax, Decimal::from(120));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(1320));
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly 1000 still pays shipping; only strictly greater ships free
        let at = totals_for_subtotal(Decimal::from(1000));
        assert_eq!(at.shipping, FLAT_SHIPPING);

        let above = totals_for_subtotal(Decimal::new(100_001, 2));
        assert_eq!(above.shipping, Decimal::ZERO);
    }

    #[test]
    fn test_total_identity() {
        for cents in [1_i64, 9999, 100_000, 123_456, 999_999] {
            let totals = totals_for_subtotal(Decimal::new(cents, 2));
            assert_eq!(
                totals.total,
                totals.subtotal + totals.tax + totals.shipping
            );
        }
    }

    #[test]
    fn test_tax_is_exact() {
        let totals = totals_for_subtotal(Decimal::new(12_345, 2)); // 123.45
        assert_eq!(totals.tax, Decimal::new(123_450, 4)); // 12.3450 exactly
        // round_dp is banker's rounding: the .345 tie goes to the even digit
        assert_eq!(totals.rounded().tax, Decimal::new(1234, 2)); // 12.34
    }

    #[test]
    fn test_rounded_preserves_identity_columns() {
        let totals = totals_for_subtotal(Decimal::from(100)).rounded();
        assert_eq!(totals.total, Decimal::from(160));
        assert_eq!(
            totals.total,
            totals.subtotal + totals.tax + totals.shipping
        );
    }
}
