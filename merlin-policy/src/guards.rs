//! Price floor/ceiling guards.
//!
//! A guard bounds the unit sell price for one product class + unit,
//! optionally per region. Clamping is silent to the end customer but every
//! clamp is recorded as a [`ClampEvent`] in the audit trail. A missing
//! guard skips clamping; the caller logs and records the warning.

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};
use crate::thresholds::MONEY_EPSILON;

/// Floor/ceiling bounds for one product class + unit (+ optional region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceGuard {
    pub product_class: String,
    /// Pricing unit, e.g. "kwh", "kw", "each".
    pub unit: String,
    #[serde(default)]
    pub region: Option<String>,
    pub floor_price: f64,
    pub ceiling_price: f64,
    /// Last observed market price, retained for admin review.
    #[serde(default)]
    pub last_market_price: Option<f64>,
}

impl PriceGuard {
    pub fn validate(&self) -> PolicyResult<()> {
        if !self.floor_price.is_finite()
            || !self.ceiling_price.is_finite()
            || self.floor_price < 0.0
            || self.floor_price >= self.ceiling_price
        {
            return Err(PolicyError::InvalidGuardBounds {
                product_class: self.product_class.clone(),
                unit: self.unit.clone(),
                floor: self.floor_price,
                ceiling: self.ceiling_price,
            });
        }
        if let Some(price) = self.last_market_price {
            if price < self.floor_price || price > self.ceiling_price {
                return Err(PolicyError::MarketPriceOutsideGuard {
                    product_class: self.product_class.clone(),
                    unit: self.unit.clone(),
                    price,
                    floor: self.floor_price,
                    ceiling: self.ceiling_price,
                });
            }
        }
        Ok(())
    }

    /// Clamp a unit price into `[floor, ceiling]`. Returns the (possibly
    /// unchanged) price and a clamp event iff clamping actually moved it.
    pub fn clamp(&self, unit_price: f64) -> (f64, Option<ClampEvent>) {
        let (clamped, bound) = if unit_price < self.floor_price - MONEY_EPSILON {
            (self.floor_price, ClampBound::Floor)
        } else if unit_price > self.ceiling_price + MONEY_EPSILON {
            (self.ceiling_price, ClampBound::Ceiling)
        } else {
            return (unit_price, None);
        };
        let event = ClampEvent {
            product_class: self.product_class.clone(),
            unit: self.unit.clone(),
            original_price: unit_price,
            clamped_price: clamped,
            bound,
        };
        (clamped, Some(event))
    }
}

/// Which bound forced the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampBound {
    Floor,
    Ceiling,
}

impl std::fmt::Display for ClampBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClampBound::Floor => write!(f, "floor"),
            ClampBound::Ceiling => write!(f, "ceiling"),
        }
    }
}

/// Record of one price being forced to a guard bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampEvent {
    pub product_class: String,
    pub unit: String,
    pub original_price: f64,
    pub clamped_price: f64,
    pub bound: ClampBound,
}

/// All configured guards, with region-specific lookup preference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardTable {
    pub guards: Vec<PriceGuard>,
}

impl GuardTable {
    pub fn validate(&self) -> PolicyResult<()> {
        for guard in &self.guards {
            guard.validate()?;
        }
        Ok(())
    }

    /// Find the guard for a product class + unit. A guard scoped to the
    /// request's region wins over a region-agnostic one.
    pub fn lookup(&self, product_class: &str, unit: &str, region: Option<&str>) -> Option<&PriceGuard> {
        let mut fallback = None;
        for guard in &self.guards {
            if guard.product_class != product_class || guard.unit != unit {
                continue;
            }
            match (&guard.region, region) {
                (Some(g), Some(r)) if g == r => return Some(guard),
                (None, _) => fallback = fallback.or(Some(guard)),
                _ => {}
            }
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bess_guard() -> PriceGuard {
        PriceGuard {
            product_class: "bess".into(),
            unit: "kwh".into(),
            region: None,
            floor_price: 100.0,
            ceiling_price: 400.0,
            last_market_price: Some(210.0),
        }
    }

    #[test]
    fn price_below_floor_clamped_with_event() {
        let (price, event) = bess_guard().clamp(90.0);
        assert!((price - 100.0).abs() < 1e-9);
        let event = event.expect("clamp event recorded");
        assert_eq!(event.bound, ClampBound::Floor);
        assert!((event.original_price - 90.0).abs() < 1e-9);
        assert!((event.clamped_price - 100.0).abs() < 1e-9);
    }

    #[test]
    fn price_above_ceiling_clamped_with_event() {
        let (price, event) = bess_guard().clamp(450.0);
        assert!((price - 400.0).abs() < 1e-9);
        assert_eq!(event.unwrap().bound, ClampBound::Ceiling);
    }

    #[test]
    fn in_range_price_untouched_no_event() {
        let (price, event) = bess_guard().clamp(250.0);
        assert!((price - 250.0).abs() < 1e-9);
        assert!(event.is_none());
    }

    #[test]
    fn boundary_price_is_not_a_clamp() {
        let (price, event) = bess_guard().clamp(100.0);
        assert!((price - 100.0).abs() < 1e-9);
        assert!(event.is_none(), "price already at the floor is unchanged");
    }

    #[test]
    fn inverted_bounds_rejected() {
        let mut guard = bess_guard();
        guard.ceiling_price = 50.0;
        assert!(matches!(
            guard.validate().unwrap_err(),
            PolicyError::InvalidGuardBounds { .. }
        ));
    }

    #[test]
    fn market_price_outside_bounds_rejected() {
        let mut guard = bess_guard();
        guard.last_market_price = Some(500.0);
        assert!(matches!(
            guard.validate().unwrap_err(),
            PolicyError::MarketPriceOutsideGuard { .. }
        ));
    }

    #[test]
    fn regional_guard_preferred_over_generic() {
        let generic = bess_guard();
        let mut regional = bess_guard();
        regional.region = Some("caiso".into());
        regional.floor_price = 120.0;
        let table = GuardTable {
            guards: vec![generic, regional],
        };

        let hit = table.lookup("bess", "kwh", Some("caiso")).unwrap();
        assert_eq!(hit.floor_price, 120.0);

        // Unknown region falls back to the generic guard.
        let hit = table.lookup("bess", "kwh", Some("ercot")).unwrap();
        assert_eq!(hit.floor_price, 100.0);

        assert!(table.lookup("solar", "kwh", None).is_none());
    }
}
