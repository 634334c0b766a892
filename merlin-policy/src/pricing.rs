//! Sell-price arithmetic and size-tiered unit pricing.
//!
//! Margin convention is margin-on-sell: `sell = cost / (1 - margin)`.
//! Unit price tiers carry the same banded-lookup semantics as margin
//! bands, keyed by product class + unit and banded on quantity: larger
//! systems buy cheaper per-unit hardware.

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// One size bracket of unit pricing for a product class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPriceTier {
    pub product_class: String,
    pub unit: String,
    /// Inclusive lower bound on quantity.
    pub min_size: f64,
    /// Exclusive upper bound; `None` means unbounded.
    pub max_size: Option<f64>,
    /// Dollars per unit within this bracket.
    pub unit_price: f64,
}

impl UnitPriceTier {
    pub fn contains(&self, size: f64) -> bool {
        size >= self.min_size && self.max_size.map_or(true, |max| size < max)
    }
}

/// All configured unit price tiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTierTable {
    pub tiers: Vec<UnitPriceTier>,
}

impl PriceTierTable {
    /// Reject overlapping tiers within each product class + unit group.
    /// Gaps are allowed; a quantity falling into one surfaces as
    /// [`PolicyError::NoMatchingPriceTier`] at resolution time.
    pub fn validate(&self) -> PolicyResult<()> {
        for (i, a) in self.tiers.iter().enumerate() {
            for b in self.tiers.iter().skip(i + 1) {
                if a.product_class != b.product_class || a.unit != b.unit {
                    continue;
                }
                let a_end = a.max_size.unwrap_or(f64::INFINITY);
                let b_end = b.max_size.unwrap_or(f64::INFINITY);
                if a.min_size < b_end && b.min_size < a_end {
                    return Err(PolicyError::TierOverlap {
                        product_class: a.product_class.clone(),
                        unit: a.unit.clone(),
                        at: a.min_size.max(b.min_size),
                    });
                }
            }
        }
        Ok(())
    }

    /// Unit price for `size` units of a product class.
    pub fn unit_price_for(&self, product_class: &str, unit: &str, size: f64) -> PolicyResult<f64> {
        if !size.is_finite() || size < 0.0 {
            return Err(PolicyError::InvalidCost(size));
        }
        self.tiers
            .iter()
            .find(|t| t.product_class == product_class && t.unit == unit && t.contains(size))
            .map(|t| t.unit_price)
            .ok_or_else(|| PolicyError::NoMatchingPriceTier {
                product_class: product_class.to_string(),
                unit: unit.to_string(),
                size,
            })
    }
}

/// Sell price for a cost at a margin-on-sell fraction.
/// Callers guarantee `margin < 1.0`; snapshot validation bounds every
/// configured margin below `MAX_MARGIN`.
pub fn sell_price(base_cost: f64, margin: f64) -> f64 {
    base_cost / (1.0 - margin)
}

/// Margin realized by a (cost, sell) pair; zero when nothing was sold.
pub fn realized_margin(total_base_cost: f64, total_sell_price: f64) -> f64 {
    if total_sell_price > 0.0 {
        (total_sell_price - total_base_cost) / total_sell_price
    } else {
        0.0
    }
}

/// Round a dollar amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
