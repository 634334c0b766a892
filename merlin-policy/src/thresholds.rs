//! Centralized policy constants for margin computation.
//!
//! These values are calibrated for commercial BESS/solar quoting.
//! Changing a value here affects BOTH snapshot validation (in `snapshot.rs`)
//! and the pricing arithmetic (in `pricing.rs`).

/// Upper bound (exclusive) for any configured or computed margin fraction.
/// Keeps the margin-on-sell division `cost / (1 - margin)` well away from
/// its pole.
pub const MAX_MARGIN: f64 = 0.95;

/// Cent-level tolerance used when comparing money amounts. Two prices
/// closer than this are the same price; a clamp event is only recorded
/// when the clamped price differs by more than this.
pub const MONEY_EPSILON: f64 = 0.005;

/// Risk level assumed when a quote request does not declare one.
pub const DEFAULT_RISK_LEVEL: &str = "standard";

/// Customer segment assumed when a quote request does not declare one.
pub const DEFAULT_SEGMENT: &str = "direct";

/// Quantity assumed for a line item that does not declare one. With a
/// quantity of 1.0 the unit sell price equals the line's total sell price.
pub const DEFAULT_QUANTITY: f64 = 1.0;
