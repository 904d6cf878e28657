//! Bulk-purchase pricing tiers.
//!
//! Wholesale customers buy in fixed set sizes; larger sets earn a larger
//! discount off the per-unit list price. The bracket table is fixed:
//!
//! | Tier    | Set size | Discount |
//! |---------|----------|----------|
//! | single  | 1        | 0%       |
//! | quarter | 3        | 10%      |
//! | half    | 6        | 15%      |
//! | full    | 12       | 20%      |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named bulk-purchase bracket.
///
/// Serialized in its lowercase wire form (`"single"`, `"quarter"`, ...);
/// an unknown tier string fails deserialization, so invalid tiers are
/// rejected at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Single,
    Quarter,
    Half,
    Full,
}

impl Tier {
    /// Number of units in one set of this tier.
    #[must_use]
    pub const fn quantity(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Quarter => 3,
            Self::Half => 6,
            Self::Full => 12,
        }
    }

    /// Discount fraction applied to the per-unit list price.
    #[must_use]
    pub fn discount(self) -> Decimal {
        match self {
            Self::Single => Decimal::ZERO,
            Self::Quarter => Decimal::new(10, 2),
            Self::Half => Decimal::new(15, 2),
            Self::Full => Decimal::new(20, 2),
        }
    }

    /// Per-unit price after the tier discount.
    ///
    /// Exact decimal arithmetic; callers round only for display or when
    /// persisting money columns, never while accumulating.
    #[must_use]
    pub fn unit_price(self, base_price: Decimal) -> Decimal {
        base_price * (Decimal::ONE - self.discount())
    }

    /// All tiers, in ascending set size.
    pub const ALL: [Self; 4] = [Self::Single, Self::Quarter, Self::Half, Self::Full];
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Quarter => write!(f, "quarter"),
            Self::Half => write!(f, "half"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "quarter" => Ok(Self::Quarter),
            "half" => Ok(Self::Half),
            "full" => Ok(Self::Full),
            _ => Err(format!("invalid tier: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_bracket_table() {
        assert_eq!(Tier::Single.quantity(), 1);
        assert_eq!(Tier::Quarter.quantity(), 3);
        assert_eq!(Tier::Half.quantity(), 6);
        assert_eq!(Tier::Full.quantity(), 12);

        assert_eq!(Tier::Single.discount(), Decimal::ZERO);
        assert_eq!(Tier::Quarter.discount(), Decimal::new(10, 2));
        assert_eq!(Tier::Half.discount(), Decimal::new(15, 2));
        assert_eq!(Tier::Full.discount(), Decimal::new(20, 2));
    }

    #[test]
    fn test_unit_price_exact() {
        // 700 at 10% off is exactly 630.00; a quarter set of 3 totals 1890.00
        let unit = Tier::Quarter.unit_price(Decimal::from(700));
        assert_eq!(unit, Decimal::new(63000, 2));
        assert_eq!(
            unit * Decimal::from(Tier::Quarter.quantity()),
            Decimal::new(189_000, 2)
        );
    }

    #[test]
    fn test_unit_price_no_discount() {
        let base = Decimal::new(9999, 2);
        assert_eq!(Tier::Single.unit_price(base), base);
    }

    #[test]
    fn test_unit_price_all_tiers_match_formula() {
        let base = Decimal::from(700);
        for tier in Tier::ALL {
            let expected = base * (Decimal::ONE - tier.discount());
            assert_eq!(tier.unit_price(base), expected);
        }
    }

    #[test]
    fn test_from_str_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_str(&tier.to_string()), Ok(tier));
        }
        assert!(Tier::from_str("double").is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Tier::Quarter).expect("serialize");
        assert_eq!(json, r#""quarter""#);
        assert!(serde_json::from_str::<Tier>(r#""bulk""#).is_err());
    }
}
