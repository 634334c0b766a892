//! The margin adjustment chain.
//!
//! Three layers in fixed order, each defined on the previous layer's
//! output: product class (intrinsic commodity pricing), then risk
//! (project-specific), then segment (commercial relationship). A missing
//! adjuster never aborts: the layer passes the margin through unchanged
//! and the caller records a warning.

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Per-product-class margin effect. Exactly one of the two modes is
/// active: multiplicative entries scale the band target, additive entries
/// add `fixed_adder` on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductClassPolicy {
    pub product_class: String,
    pub margin_multiplier: f64,
    pub is_additive: bool,
    #[serde(default)]
    pub fixed_adder: f64,
}

impl ProductClassPolicy {
    pub fn validate(&self) -> PolicyResult<()> {
        if !self.is_additive && self.fixed_adder != 0.0 {
            return Err(PolicyError::AmbiguousProductPolicy(
                self.product_class.clone(),
            ));
        }
        if !self.is_additive && (!self.margin_multiplier.is_finite() || self.margin_multiplier <= 0.0)
        {
            return Err(PolicyError::InvalidMultiplier {
                product_class: self.product_class.clone(),
                multiplier: self.margin_multiplier,
            });
        }
        if self.is_additive && !self.fixed_adder.is_finite() {
            return Err(PolicyError::InvalidMargin {
                context: format!("product policy '{}' fixed_adder", self.product_class),
                value: self.fixed_adder,
            });
        }
        Ok(())
    }
}

/// Flat additive percentage for a declared project risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAdjuster {
    pub risk_level: String,
    pub margin_add_percent: f64,
}

/// Multiplicative discount/premium for a customer segment, applied last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAdjuster {
    pub segment: String,
    pub margin_multiplier: f64,
}

/// The margin after every layer of the chain, preserved for the audit
/// trail so a reviewer can replay the computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBreakdown {
    pub band_target: f64,
    pub after_product: f64,
    pub after_risk: f64,
    pub after_segment: f64,
}

impl MarginBreakdown {
    pub fn final_margin(&self) -> f64 {
        self.after_segment
    }
}

/// Layer 1: product-class effect on the band's target margin.
pub fn product_adjusted(band_target: f64, policy: Option<&ProductClassPolicy>) -> f64 {
    match policy {
        Some(p) if p.is_additive => band_target + p.fixed_adder,
        Some(p) => band_target * p.margin_multiplier,
        // Missing policy: multiplier 1.0. The caller records the warning.
        None => band_target,
    }
}

/// Layer 2: additive risk percentage.
pub fn risk_adjusted(margin: f64, adjuster: Option<&RiskAdjuster>) -> f64 {
    match adjuster {
        Some(a) => margin + a.margin_add_percent,
        None => margin,
    }
}

/// Layer 3: multiplicative segment effect.
pub fn segment_adjusted(margin: f64, adjuster: Option<&SegmentAdjuster>) -> f64 {
    match adjuster {
        Some(a) => margin * a.margin_multiplier,
        None => margin,
    }
}

/// Run the full chain and capture the per-layer trace.
pub fn apply_chain(
    band_target: f64,
    product: Option<&ProductClassPolicy>,
    risk: Option<&RiskAdjuster>,
    segment: Option<&SegmentAdjuster>,
) -> MarginBreakdown {
    let after_product = product_adjusted(band_target, product);
    let after_risk = risk_adjusted(after_product, risk);
    let after_segment = segment_adjusted(after_risk, segment);
    MarginBreakdown {
        band_target,
        after_product,
        after_risk,
        after_segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar() -> ProductClassPolicy {
        ProductClassPolicy {
            product_class: "solar".into(),
            margin_multiplier: 0.75,
            is_additive: false,
            fixed_adder: 0.0,
        }
    }

    fn elevated() -> RiskAdjuster {
        RiskAdjuster {
            risk_level: "elevated".into(),
            margin_add_percent: 0.02,
        }
    }

    fn epc() -> SegmentAdjuster {
        SegmentAdjuster {
            segment: "epc_partner".into(),
            margin_multiplier: 0.85,
        }
    }

    #[test]
    fn spec_worked_example() {
        // band small target 0.18, solar x0.75, elevated +0.02, epc x0.85
        let trace = apply_chain(0.18, Some(&solar()), Some(&elevated()), Some(&epc()));
        assert!((trace.after_product - 0.135).abs() < 1e-12);
        assert!((trace.after_risk - 0.155).abs() < 1e-12);
        assert!((trace.final_margin() - 0.13175).abs() < 1e-12);
    }

    #[test]
    fn additive_product_policy_adds_on_raw_target() {
        let custom = ProductClassPolicy {
            product_class: "custom_integration".into(),
            margin_multiplier: 1.0,
            is_additive: true,
            fixed_adder: 0.05,
        };
        assert!((product_adjusted(0.18, Some(&custom)) - 0.23).abs() < 1e-12);
    }

    #[test]
    fn missing_layers_pass_margin_through() {
        let trace = apply_chain(0.18, None, None, None);
        assert_eq!(trace.final_margin(), 0.18);
        assert_eq!(trace.after_product, 0.18);
        assert_eq!(trace.after_risk, 0.18);
    }

    #[test]
    fn order_is_product_then_risk_then_segment() {
        // x0.75 then +0.02 then x0.85 differs from any other ordering.
        let chained = apply_chain(0.18, Some(&solar()), Some(&elevated()), Some(&epc()));
        let wrong_order = (0.18 + 0.02) * 0.75 * 0.85;
        assert!((chained.final_margin() - wrong_order).abs() > 1e-6);
    }

    #[test]
    fn multiplicative_policy_with_adder_rejected() {
        let bad = ProductClassPolicy {
            product_class: "bess".into(),
            margin_multiplier: 1.1,
            is_additive: false,
            fixed_adder: 0.03,
        };
        assert!(matches!(
            bad.validate().unwrap_err(),
            PolicyError::AmbiguousProductPolicy(_)
        ));
    }

    #[test]
    fn non_positive_multiplier_rejected() {
        let bad = ProductClassPolicy {
            product_class: "bess".into(),
            margin_multiplier: 0.0,
            is_additive: false,
            fixed_adder: 0.0,
        };
        assert!(matches!(
            bad.validate().unwrap_err(),
            PolicyError::InvalidMultiplier { .. }
        ));
    }
}
