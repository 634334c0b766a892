//! Policy error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.
//! Two families matter to callers: configuration errors (a policy table is
//! broken or has a hole; surfaced to the administrator, computation
//! aborted) and validation errors (the caller's input is malformed;
//! rejected before any computation runs). Clamping is neither: it is an
//! expected, auditable adjustment and never surfaces as an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("no margin band matches total base cost ${0:.2}")]
    NoMatchingBand(f64),

    #[error("band table is empty")]
    EmptyBandTable,

    #[error("band '{id}' has invalid bounds: min {min} .. max {max:?}")]
    InvalidBandBounds {
        id: String,
        min: f64,
        max: Option<f64>,
    },

    #[error("band table does not start at $0 (band '{id}' starts at ${start:.2})")]
    BandTableStartsAbove {
        id: String,
        start: f64,
    },

    #[error("gap between band '{prev}' (ends at ${end:.2}) and band '{next}' (starts at ${start:.2})")]
    BandGap {
        prev: String,
        end: f64,
        next: String,
        start: f64,
    },

    #[error("bands '{prev}' and '{next}' overlap at ${at:.2}")]
    BandOverlap {
        prev: String,
        next: String,
        at: f64,
    },

    #[error("band table has no unbounded top band (band '{id}' ends at ${end:.2})")]
    NoUnboundedTopBand {
        id: String,
        end: f64,
    },

    #[error("band '{id}' margins out of order: min {min}, target {target}, max {max}")]
    MarginOutOfOrder {
        id: String,
        min: f64,
        target: f64,
        max: f64,
    },

    #[error("margin {value} for {context} is outside the allowed range")]
    InvalidMargin {
        context: String,
        value: f64,
    },

    #[error("product policy '{0}' mixes multiplicative and additive modes")]
    AmbiguousProductPolicy(String),

    #[error("product policy '{product_class}' has non-positive multiplier {multiplier}")]
    InvalidMultiplier {
        product_class: String,
        multiplier: f64,
    },

    #[error("price guard for {product_class}/{unit} has floor ${floor:.2} >= ceiling ${ceiling:.2}")]
    InvalidGuardBounds {
        product_class: String,
        unit: String,
        floor: f64,
        ceiling: f64,
    },

    #[error(
        "price guard for {product_class}/{unit}: last market price ${price:.2} \
         lies outside [${floor:.2}, ${ceiling:.2}]"
    )]
    MarketPriceOutsideGuard {
        product_class: String,
        unit: String,
        price: f64,
        floor: f64,
        ceiling: f64,
    },

    #[error("unit price tiers for {product_class}/{unit} overlap at size {at}")]
    TierOverlap {
        product_class: String,
        unit: String,
        at: f64,
    },

    #[error("no unit price tier covers {product_class}/{unit} at size {size}")]
    NoMatchingPriceTier {
        product_class: String,
        unit: String,
        size: f64,
    },

    #[error("total base cost {0} is not a finite, non-negative amount")]
    InvalidCost(f64),

    #[error("line item {index} ('{product_class}') has invalid {field}: {value}")]
    InvalidLineItem {
        index: usize,
        product_class: String,
        field: &'static str,
        value: f64,
    },
}

impl PolicyError {
    /// Is this a configuration error, i.e. a broken or incomplete policy table?
    /// Configuration errors abort the computation and are surfaced to the
    /// policy administrator, never silently defaulted.
    pub fn is_configuration(&self) -> bool {
        !self.is_validation()
    }

    /// Is this a validation error, i.e. malformed caller input rejected before
    /// any computation runs?
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PolicyError::InvalidCost(_) | PolicyError::InvalidLineItem { .. }
        )
    }
}

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_band_is_configuration() {
        let err = PolicyError::NoMatchingBand(750_000.0);
        assert!(err.is_configuration());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_invalid_cost_is_validation() {
        let err = PolicyError::InvalidCost(-1.0);
        assert!(err.is_validation());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = PolicyError::BandGap {
            prev: "small".into(),
            end: 1_000_000.0,
            next: "large".into(),
            start: 1_500_000.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("small"));
        assert!(msg.contains("large"));
        assert!(msg.contains("1000000.00"));
    }
}
