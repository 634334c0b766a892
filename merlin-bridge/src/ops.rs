//! Quote operations — the complete vocabulary of valid actions.
//!
//! Caller JSON gets parsed into exactly one of these variants. If it
//! doesn't parse, the operation is REJECTED. No partial execution, no
//! silent failures, no half-applied policy edits.
//!
//! This enum is exhaustive. The compiler guarantees every variant has a
//! handler in the protocol module; adding an operation without handling
//! it everywhere is a compile error.

use serde::{Deserialize, Serialize};

use merlin_pipeline::types::QuoteRequest;
use merlin_policy::adjust::{ProductClassPolicy, RiskAdjuster, SegmentAdjuster};
use merlin_policy::bands::MarginBand;
use merlin_policy::guards::PriceGuard;

/// Every valid operation a caller can request of the margin engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "params")]
pub enum QuoteOperation {
    // ========================================
    // POLICY READS (read-only, always safe)
    // ========================================

    /// Resolve the margin band for a total base cost.
    /// Returns: the band with its min/target/max margins.
    ResolveBand { total_base_cost: f64 },

    /// List every configured band in cost order.
    ListBands,

    /// Fetch the margin policy for one product class.
    GetProductPolicy { product_class: String },

    /// Fetch the price guard for a product class + unit, preferring a
    /// region-specific guard when a region is given.
    GetPriceGuard {
        product_class: String,
        unit: String,
        region: Option<String>,
    },

    /// Summarize the active policy: version, table sizes, validity.
    PolicyInfo,

    /// Re-run whole-snapshot validation and report the outcome.
    ValidatePolicy,

    /// Fetch one margin audit entry by id.
    GetAuditEntry { entry_id: String },

    /// Fetch the most recent margin audit entries, newest first.
    ListAuditEntries { limit: usize },

    /// Fetch the questionnaire for one industry use case.
    GetQuestionnaire { use_case: String },

    // ========================================
    // COMPUTATION (appends one audit entry)
    // ========================================

    /// Price a quote: resolve the band, run the adjustment chain, clamp
    /// against guards, and record the margin audit entry.
    ComputeQuote { request: QuoteRequest },

    // ========================================
    // POLICY MUTATION (versioned, audited)
    // ========================================

    /// Insert or replace a margin band. The edited table must still
    /// partition the cost axis or the whole edit is rejected.
    UpsertBand { band: MarginBand },

    /// Remove a band by id. Rejected if the remaining table no longer
    /// partitions the cost axis; replace the neighbor first.
    RemoveBand { id: String },

    /// Insert or replace a product class policy.
    UpsertProductPolicy { policy: ProductClassPolicy },

    /// Insert or replace a risk adjuster.
    UpsertRiskAdjuster { adjuster: RiskAdjuster },

    /// Insert or replace a segment adjuster.
    UpsertSegmentAdjuster { adjuster: SegmentAdjuster },

    /// Insert or replace a price guard (keyed by product class + unit +
    /// region).
    UpsertPriceGuard { guard: PriceGuard },

    /// Run the catalog normalization pass: merge universal questions,
    /// dedupe by field name, renumber display order.
    NormalizeCatalog,
}

impl QuoteOperation {
    /// Is this operation read-only? Read-only operations never change the
    /// policy store or append audit entries.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            QuoteOperation::ResolveBand { .. }
                | QuoteOperation::ListBands
                | QuoteOperation::GetProductPolicy { .. }
                | QuoteOperation::GetPriceGuard { .. }
                | QuoteOperation::PolicyInfo
                | QuoteOperation::ValidatePolicy
                | QuoteOperation::GetAuditEntry { .. }
                | QuoteOperation::ListAuditEntries { .. }
                | QuoteOperation::GetQuestionnaire { .. }
        )
    }

    /// Does this operation edit policy or catalog content?
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            QuoteOperation::UpsertBand { .. }
                | QuoteOperation::RemoveBand { .. }
                | QuoteOperation::UpsertProductPolicy { .. }
                | QuoteOperation::UpsertRiskAdjuster { .. }
                | QuoteOperation::UpsertSegmentAdjuster { .. }
                | QuoteOperation::UpsertPriceGuard { .. }
                | QuoteOperation::NormalizeCatalog
        )
    }

    /// Human-readable description of what this operation does.
    pub fn describe(&self) -> String {
        match self {
            QuoteOperation::ResolveBand { total_base_cost } => {
                format!("Resolve band for ${total_base_cost:.2}")
            }
            QuoteOperation::ListBands => "List margin bands".into(),
            QuoteOperation::GetProductPolicy { product_class } => {
                format!("Get product policy '{product_class}'")
            }
            QuoteOperation::GetPriceGuard {
                product_class,
                unit,
                region,
            } => match region {
                Some(r) => format!("Get price guard {product_class}/{unit} in '{r}'"),
                None => format!("Get price guard {product_class}/{unit}"),
            },
            QuoteOperation::PolicyInfo => "Policy summary".into(),
            QuoteOperation::ValidatePolicy => "Validate active policy".into(),
            QuoteOperation::GetAuditEntry { entry_id } => {
                format!("Get audit entry '{entry_id}'")
            }
            QuoteOperation::ListAuditEntries { limit } => {
                format!("List {limit} recent audit entries")
            }
            QuoteOperation::GetQuestionnaire { use_case } => {
                format!("Get questionnaire for '{use_case}'")
            }
            QuoteOperation::ComputeQuote { request } => format!(
                "Compute quote '{}' ({} lines)",
                request.request_id,
                request.line_items.len()
            ),
            QuoteOperation::UpsertBand { band } => format!("Upsert band '{}'", band.id),
            QuoteOperation::RemoveBand { id } => format!("Remove band '{id}'"),
            QuoteOperation::UpsertProductPolicy { policy } => {
                format!("Upsert product policy '{}'", policy.product_class)
            }
            QuoteOperation::UpsertRiskAdjuster { adjuster } => {
                format!("Upsert risk adjuster '{}'", adjuster.risk_level)
            }
            QuoteOperation::UpsertSegmentAdjuster { adjuster } => {
                format!("Upsert segment adjuster '{}'", adjuster.segment)
            }
            QuoteOperation::UpsertPriceGuard { guard } => {
                format!("Upsert price guard {}/{}", guard.product_class, guard.unit)
            }
            QuoteOperation::NormalizeCatalog => "Normalize questionnaire catalog".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_band() {
        let json = r#"{"op": "ResolveBand", "params": {"total_base_cost": 750000.0}}"#;
        let op: QuoteOperation = serde_json::from_str(json).unwrap();
        assert!(op.is_read_only());
        assert!(!op.is_mutation());
    }

    #[test]
    fn test_parse_compute_quote() {
        let json = r#"{
            "op": "ComputeQuote",
            "params": {
                "request": {
                    "request_id": "q-100",
                    "total_base_cost": 750000.0,
                    "line_items": [
                        {"product_class": "bess", "unit": "kwh", "quantity": 2000.0}
                    ],
                    "risk_level": "elevated",
                    "customer_segment": "epc_partner"
                }
            }
        }"#;
        let op: QuoteOperation = serde_json::from_str(json).unwrap();
        assert!(!op.is_read_only());
        assert!(!op.is_mutation());
    }

    #[test]
    fn test_parse_upsert_band() {
        let json = r#"{
            "op": "UpsertBand",
            "params": {
                "band": {
                    "id": "small",
                    "min_total": 0.0,
                    "max_total": 1000000.0,
                    "margin_min": 0.15,
                    "margin_max": 0.20,
                    "margin_target": 0.18
                }
            }
        }"#;
        let op: QuoteOperation = serde_json::from_str(json).unwrap();
        assert!(op.is_mutation());
    }

    #[test]
    fn test_invalid_op_rejected() {
        let json = r#"{"op": "DropAllTables", "params": {}}"#;
        let result: Result<QuoteOperation, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_all_ops_described() {
        use merlin_pipeline::types::QuoteRequest;
        use merlin_policy::adjust::{ProductClassPolicy, RiskAdjuster, SegmentAdjuster};
        use merlin_policy::bands::MarginBand;
        use merlin_policy::guards::PriceGuard;

        let ops = vec![
            QuoteOperation::ResolveBand {
                total_base_cost: 1.0,
            },
            QuoteOperation::ListBands,
            QuoteOperation::GetProductPolicy {
                product_class: "bess".into(),
            },
            QuoteOperation::GetPriceGuard {
                product_class: "bess".into(),
                unit: "kwh".into(),
                region: None,
            },
            QuoteOperation::PolicyInfo,
            QuoteOperation::ValidatePolicy,
            QuoteOperation::GetAuditEntry {
                entry_id: "MA-000001".into(),
            },
            QuoteOperation::ListAuditEntries { limit: 10 },
            QuoteOperation::GetQuestionnaire {
                use_case: "cold_storage".into(),
            },
            QuoteOperation::ComputeQuote {
                request: QuoteRequest {
                    request_id: "q".into(),
                    total_base_cost: 1.0,
                    line_items: vec![],
                    risk_level: None,
                    customer_segment: None,
                    policy_version: None,
                    region: None,
                    resolved_band: None,
                },
            },
            QuoteOperation::UpsertBand {
                band: MarginBand {
                    id: "b".into(),
                    min_total: 0.0,
                    max_total: None,
                    margin_min: 0.1,
                    margin_max: 0.2,
                    margin_target: 0.15,
                    description: String::new(),
                },
            },
            QuoteOperation::RemoveBand { id: "b".into() },
            QuoteOperation::UpsertProductPolicy {
                policy: ProductClassPolicy {
                    product_class: "bess".into(),
                    margin_multiplier: 1.0,
                    is_additive: false,
                    fixed_adder: 0.0,
                },
            },
            QuoteOperation::UpsertRiskAdjuster {
                adjuster: RiskAdjuster {
                    risk_level: "standard".into(),
                    margin_add_percent: 0.0,
                },
            },
            QuoteOperation::UpsertSegmentAdjuster {
                adjuster: SegmentAdjuster {
                    segment: "direct".into(),
                    margin_multiplier: 1.0,
                },
            },
            QuoteOperation::UpsertPriceGuard {
                guard: PriceGuard {
                    product_class: "bess".into(),
                    unit: "kwh".into(),
                    region: None,
                    floor_price: 100.0,
                    ceiling_price: 400.0,
                    last_market_price: None,
                },
            },
            QuoteOperation::NormalizeCatalog,
        ];

        for op in &ops {
            let desc = op.describe();
            assert!(!desc.is_empty(), "Empty description for {:?}", op);
        }
    }
}
