//! Versioned policy snapshots.
//!
//! All policy tables are loaded wholesale into one immutable snapshot per
//! computation, tagged with a version string. Admin edits produce a new
//! snapshot; quote computations never see a half-edited policy. Lookups
//! here are the plain-function replacements for the legacy
//! `get_margin_band`-style stored procedures.

use serde::{Deserialize, Serialize};

use crate::adjust::{ProductClassPolicy, RiskAdjuster, SegmentAdjuster};
use crate::bands::BandTable;
use crate::error::PolicyResult;
use crate::guards::GuardTable;
use crate::pricing::PriceTierTable;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Policy version tag recorded on every audit entry, e.g. "2026-08.v3".
    pub version: String,
    pub bands: BandTable,
    pub product_policies: Vec<ProductClassPolicy>,
    pub risk_adjusters: Vec<RiskAdjuster>,
    pub segment_adjusters: Vec<SegmentAdjuster>,
    pub guards: GuardTable,
    pub price_tiers: PriceTierTable,
}

impl PolicySnapshot {
    /// Validate every table as a unit. A snapshot that fails here must
    /// never be used for pricing.
    pub fn validate(&self) -> PolicyResult<()> {
        self.bands.validate()?;
        for policy in &self.product_policies {
            policy.validate()?;
        }
        self.guards.validate()?;
        self.price_tiers.validate()?;
        Ok(())
    }

    pub fn product_policy(&self, product_class: &str) -> Option<&ProductClassPolicy> {
        self.product_policies
            .iter()
            .find(|p| p.product_class == product_class)
    }

    pub fn risk_adjuster(&self, risk_level: &str) -> Option<&RiskAdjuster> {
        self.risk_adjusters
            .iter()
            .find(|r| r.risk_level == risk_level)
    }

    pub fn segment_adjuster(&self, segment: &str) -> Option<&SegmentAdjuster> {
        self.segment_adjusters.iter().find(|s| s.segment == segment)
    }
}
