//! Margin policy core for the Merlin quoting platform.
//!
//! Pure, synchronous policy algebra: deal-size margin bands, the ordered
//! product/risk/segment adjustment chain, price guard clamping, size-tiered
//! unit pricing, and the append-only margin audit log. No I/O lives here:
//! policy tables arrive as a validated [`snapshot::PolicySnapshot`] and every
//! computation is deterministic given that snapshot.

pub mod adjust;
pub mod audit;
pub mod bands;
pub mod error;
pub mod guards;
pub mod pricing;
pub mod snapshot;
pub mod thresholds;

pub use adjust::{MarginBreakdown, ProductClassPolicy, RiskAdjuster, SegmentAdjuster};
pub use audit::{AuditLog, MarginAuditEntry};
pub use bands::{BandTable, MarginBand};
pub use error::PolicyError;
pub use guards::{ClampBound, ClampEvent, GuardTable, PriceGuard};
pub use pricing::{PriceTierTable, UnitPriceTier};
pub use snapshot::PolicySnapshot;
