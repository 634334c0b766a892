//! Bridge protocol — request parsing, execution, and response formatting.
//!
//! This is where the contract enforcement happens:
//! 1. Caller JSON -> parse into QuoteOperation (reject if invalid)
//! 2. Validate parameters (reject if out of bounds)
//! 3. Dispatch against the versioned policy store
//! 4. Format the structured response
//! 5. Log the operation in the ops audit trail

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use merlin_catalog::{dedupe_questions, merge_universal_questions, renumber_display_order};
use merlin_pipeline::pipelines::quote_pricing::QuotePricingPipeline;
use merlin_pipeline::pricing_pipeline::{PipelineResult, QuotePipeline};
use merlin_pipeline::types::{PricedLine, QuoteRequest};
use merlin_policy::adjust::{ProductClassPolicy, RiskAdjuster, SegmentAdjuster};
use merlin_policy::audit::MarginAuditEntry;
use merlin_policy::bands::MarginBand;
use merlin_policy::guards::{ClampEvent, PriceGuard};
use merlin_policy::pricing::{realized_margin, round_cents};
use merlin_policy::snapshot::PolicySnapshot;

use crate::error::{BridgeError, BridgeResult};
use crate::ops::QuoteOperation;
use crate::state::{PolicyStatus, PolicyStore};

/// A request from the quote-generation system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    /// The operation to perform.
    pub operation: QuoteOperation,

    /// Request ID for tracking.
    pub request_id: String,

    /// Optional context: why is the caller making this request?
    pub context: Option<String>,
}

/// A response from the margin engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    /// The operation result.
    pub result: OperationResult,

    /// Request ID (echoed back).
    pub request_id: String,

    /// Was this operation read-only?
    pub read_only: bool,

    /// Policy version active after the operation.
    pub policy_version: String,
}

/// Ops audit entry: one per processed request, including failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsAuditEntry {
    pub seq: u64,
    pub request_id: String,
    pub operation: String,
    pub read_only: bool,
    pub success: bool,
    pub error: Option<String>,
    pub version_before: String,
    pub version_after: String,
}

/// The priced quote returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteOutcome {
    pub request_id: String,
    pub policy_version: String,
    pub band_id: String,
    pub total_base_cost: f64,
    pub total_sell_price: f64,
    pub blended_margin: f64,
    pub lines: Vec<PricedLine>,
    /// Lines excluded by filters (zero quantity or cost), reported back.
    pub excluded_lines: Vec<PricedLine>,
    pub clamp_events: Vec<ClampEvent>,
    pub warnings: Vec<String>,
    pub audit_entry_id: Option<String>,
}

impl QuoteOutcome {
    fn from_pipeline(result: PipelineResult<QuoteRequest, PricedLine>, store: &PolicyStore) -> Self {
        let PipelineResult {
            query,
            filtered_candidates,
            selected_candidates: lines,
            ..
        } = result;

        let priced_base: f64 = lines.iter().map(|l| l.base_cost).sum();
        let total_sell: f64 = lines.iter().filter_map(|l| l.sell_price).sum();

        let clamp_events: Vec<ClampEvent> =
            lines.iter().filter_map(|l| l.clamp_event.clone()).collect();
        let mut warnings: Vec<String> = lines.iter().flat_map(|l| l.warnings.clone()).collect();
        warnings.sort();
        warnings.dedup();

        Self {
            request_id: query.request_id.clone(),
            policy_version: query.policy_version.clone().unwrap_or_default(),
            band_id: query
                .resolved_band
                .as_ref()
                .map(|b| b.id.clone())
                .unwrap_or_default(),
            total_base_cost: query.total_base_cost,
            total_sell_price: round_cents(total_sell),
            blended_margin: realized_margin(priced_base, total_sell),
            audit_entry_id: store
                .audit
                .find_by_request(&query.request_id)
                .map(|e| e.entry_id),
            lines,
            excluded_lines: filtered_candidates,
            clamp_events,
            warnings,
        }
    }
}

/// Response to a specific operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperationResult {
    /// A resolved margin band.
    BandResult { band: MarginBand },

    /// All configured bands in cost order.
    BandsResult { bands: Vec<MarginBand> },

    /// One product class policy.
    ProductPolicyResult { policy: ProductClassPolicy },

    /// One price guard.
    PriceGuardResult { guard: PriceGuard },

    /// Policy summary for administrators.
    PolicyInfoResult { status: PolicyStatus },

    /// Outcome of a validation pass.
    PolicyValidationResult { valid: bool, error: Option<String> },

    /// One margin audit entry.
    AuditEntryResult { entry: MarginAuditEntry },

    /// Recent margin audit entries, newest first.
    AuditEntriesResult { entries: Vec<MarginAuditEntry> },

    /// The questionnaire for one use case.
    QuestionnaireResult {
        use_case: String,
        questions: Vec<merlin_catalog::Question>,
    },

    /// A priced quote.
    QuoteResult { quote: QuoteOutcome },

    /// A policy edit was applied.
    PolicyUpdatedResult { version: String, detail: String },

    /// The catalog normalization pass completed.
    CatalogNormalizedResult {
        universal_added: usize,
        duplicates_removed: usize,
    },
}

/// The Bridge parses, validates, dispatches and audits operations.
pub struct Bridge {
    store: PolicyStore,

    /// Ops audit trail: every processed request, including failures.
    pub ops_audit: Vec<OpsAuditEntry>,

    /// Upper bound accepted for ListAuditEntries.
    pub max_audit_page: usize,

    /// Request counter for the ops audit.
    step: u64,
}

impl Bridge {
    pub fn new(snapshot: PolicySnapshot) -> BridgeResult<Self> {
        Ok(Bridge {
            store: PolicyStore::new(snapshot)?,
            ops_audit: Vec::new(),
            max_audit_page: 1000,
            step: 0,
        })
    }

    pub fn with_catalog(
        snapshot: PolicySnapshot,
        catalog: merlin_catalog::QuestionCatalog,
    ) -> BridgeResult<Self> {
        Ok(Bridge {
            store: PolicyStore::new(snapshot)?.with_catalog(catalog),
            ops_audit: Vec::new(),
            max_audit_page: 1000,
            step: 0,
        })
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    /// Parse raw caller JSON into a validated BridgeRequest.
    ///
    /// This is the first line of defense: if the payload doesn't parse
    /// into a valid operation, it's rejected here.
    pub fn parse_request(&self, raw_json: &str) -> BridgeResult<BridgeRequest> {
        let request: BridgeRequest = serde_json::from_str(raw_json)
            .map_err(|e| BridgeError::UnknownOperation(format!("Failed to parse request: {e}")))?;

        self.validate_operation(&request.operation)?;
        Ok(request)
    }

    /// Validate operation parameters.
    fn validate_operation(&self, op: &QuoteOperation) -> BridgeResult<()> {
        match op {
            QuoteOperation::ResolveBand { total_base_cost } => {
                if !total_base_cost.is_finite() {
                    return Err(BridgeError::InvalidParameter {
                        op: "ResolveBand".into(),
                        reason: format!("total_base_cost={total_base_cost} is not finite"),
                    });
                }
            }
            QuoteOperation::ListAuditEntries { limit } => {
                if *limit == 0 || *limit > self.max_audit_page {
                    return Err(BridgeError::InvalidParameter {
                        op: "ListAuditEntries".into(),
                        reason: format!("limit={} out of range [1, {}]", limit, self.max_audit_page),
                    });
                }
            }
            QuoteOperation::ComputeQuote { request } => {
                if request.request_id.trim().is_empty() {
                    return Err(BridgeError::InvalidParameter {
                        op: "ComputeQuote".into(),
                        reason: "request_id must not be empty".into(),
                    });
                }
                if request.line_items.is_empty() {
                    return Err(BridgeError::InvalidParameter {
                        op: "ComputeQuote".into(),
                        reason: "line_items must not be empty".into(),
                    });
                }
            }
            QuoteOperation::GetQuestionnaire { use_case } => {
                if use_case.trim().is_empty() {
                    return Err(BridgeError::InvalidParameter {
                        op: "GetQuestionnaire".into(),
                        reason: "use_case must not be empty".into(),
                    });
                }
            }
            _ => {} // Other operations have no parameter constraints
        }
        Ok(())
    }

    /// Process a validated request, recording it in the ops audit trail.
    pub async fn process(&mut self, request: &BridgeRequest) -> BridgeResult<BridgeResponse> {
        let version_before = self.store.active_version().to_string();
        self.step += 1;

        let result = self.dispatch(&request.operation).await;
        let version_after = self.store.active_version().to_string();

        self.ops_audit.push(OpsAuditEntry {
            seq: self.step,
            request_id: request.request_id.clone(),
            operation: request.operation.describe(),
            read_only: request.operation.is_read_only(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
            version_before,
            version_after: version_after.clone(),
        });

        Ok(BridgeResponse {
            result: result?,
            request_id: request.request_id.clone(),
            read_only: request.operation.is_read_only(),
            policy_version: version_after,
        })
    }

    async fn dispatch(&mut self, operation: &QuoteOperation) -> BridgeResult<OperationResult> {
        match operation {
            QuoteOperation::ResolveBand { total_base_cost } => {
                let snapshot = self.store.snapshot();
                let band = snapshot.bands.resolve(*total_base_cost)?.clone();
                Ok(OperationResult::BandResult { band })
            }

            QuoteOperation::ListBands => Ok(OperationResult::BandsResult {
                bands: self.store.snapshot().bands.bands.clone(),
            }),

            QuoteOperation::GetProductPolicy { product_class } => self
                .store
                .snapshot()
                .product_policy(product_class)
                .cloned()
                .map(|policy| OperationResult::ProductPolicyResult { policy })
                .ok_or_else(|| BridgeError::UnknownProductPolicy(product_class.clone())),

            QuoteOperation::GetPriceGuard {
                product_class,
                unit,
                region,
            } => self
                .store
                .snapshot()
                .guards
                .lookup(product_class, unit, region.as_deref())
                .cloned()
                .map(|guard| OperationResult::PriceGuardResult { guard })
                .ok_or_else(|| BridgeError::UnknownPriceGuard {
                    product_class: product_class.clone(),
                    unit: unit.clone(),
                }),

            QuoteOperation::PolicyInfo => Ok(OperationResult::PolicyInfoResult {
                status: self.store.status(),
            }),

            QuoteOperation::ValidatePolicy => {
                let error = self.store.snapshot().validate().err().map(|e| e.to_string());
                Ok(OperationResult::PolicyValidationResult {
                    valid: error.is_none(),
                    error,
                })
            }

            QuoteOperation::GetAuditEntry { entry_id } => self
                .store
                .audit
                .get(entry_id)
                .map(|entry| OperationResult::AuditEntryResult { entry })
                .ok_or_else(|| BridgeError::UnknownAuditEntry(entry_id.clone())),

            QuoteOperation::ListAuditEntries { limit } => Ok(OperationResult::AuditEntriesResult {
                entries: self.store.audit.recent(*limit),
            }),

            QuoteOperation::GetQuestionnaire { use_case } => {
                let catalog = self.store.catalog().ok_or(BridgeError::NoCatalog)?;
                let template = catalog
                    .get(use_case)
                    .ok_or_else(|| BridgeError::UnknownUseCase(use_case.clone()))?;
                Ok(OperationResult::QuestionnaireResult {
                    use_case: template.use_case.clone(),
                    questions: template.questions.clone(),
                })
            }

            QuoteOperation::ComputeQuote { request } => {
                if let Some(requested) = &request.policy_version {
                    if requested != self.store.active_version() {
                        return Err(BridgeError::UnknownPolicyVersion {
                            requested: requested.clone(),
                            active: self.store.active_version().to_string(),
                        });
                    }
                }

                let pipeline = QuotePricingPipeline::new(
                    self.store.snapshot(),
                    Arc::clone(&self.store.audit),
                );
                let result = pipeline.execute(request.clone()).await?;
                Ok(OperationResult::QuoteResult {
                    quote: QuoteOutcome::from_pipeline(result, &self.store),
                })
            }

            QuoteOperation::UpsertBand { band } => {
                let band = band.clone();
                let detail = format!("band '{}'", band.id);
                let version = self.store.apply(move |s| {
                    match s.bands.bands.iter_mut().find(|b| b.id == band.id) {
                        Some(existing) => *existing = band,
                        None => s.bands.bands.push(band),
                    }
                    s.bands.bands.sort_by(|a, b| {
                        a.min_total
                            .partial_cmp(&b.min_total)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                })?;
                Ok(OperationResult::PolicyUpdatedResult { version, detail })
            }

            QuoteOperation::RemoveBand { id } => {
                if self.store.snapshot().bands.get(id).is_none() {
                    return Err(BridgeError::UnknownBand(id.clone()));
                }
                let band_id = id.clone();
                let version = self
                    .store
                    .apply(move |s| s.bands.bands.retain(|b| b.id != band_id))?;
                Ok(OperationResult::PolicyUpdatedResult {
                    version,
                    detail: format!("removed band '{id}'"),
                })
            }

            QuoteOperation::UpsertProductPolicy { policy } => {
                let policy = policy.clone();
                let detail = format!("product policy '{}'", policy.product_class);
                let version = self.store.apply(move |s| {
                    match s
                        .product_policies
                        .iter_mut()
                        .find(|p| p.product_class == policy.product_class)
                    {
                        Some(existing) => *existing = policy,
                        None => s.product_policies.push(policy),
                    }
                })?;
                Ok(OperationResult::PolicyUpdatedResult { version, detail })
            }

            QuoteOperation::UpsertRiskAdjuster { adjuster } => {
                let adjuster = adjuster.clone();
                let detail = format!("risk adjuster '{}'", adjuster.risk_level);
                let version = self.store.apply(move |s| {
                    match s
                        .risk_adjusters
                        .iter_mut()
                        .find(|r| r.risk_level == adjuster.risk_level)
                    {
                        Some(existing) => *existing = adjuster,
                        None => s.risk_adjusters.push(adjuster),
                    }
                })?;
                Ok(OperationResult::PolicyUpdatedResult { version, detail })
            }

            QuoteOperation::UpsertSegmentAdjuster { adjuster } => {
                let adjuster = adjuster.clone();
                let detail = format!("segment adjuster '{}'", adjuster.segment);
                let version = self.store.apply(move |s| {
                    match s
                        .segment_adjusters
                        .iter_mut()
                        .find(|a| a.segment == adjuster.segment)
                    {
                        Some(existing) => *existing = adjuster,
                        None => s.segment_adjusters.push(adjuster),
                    }
                })?;
                Ok(OperationResult::PolicyUpdatedResult { version, detail })
            }

            QuoteOperation::UpsertPriceGuard { guard } => {
                let guard = guard.clone();
                let detail = format!("price guard {}/{}", guard.product_class, guard.unit);
                let version = self.store.apply(move |s| {
                    match s.guards.guards.iter_mut().find(|g| {
                        g.product_class == guard.product_class
                            && g.unit == guard.unit
                            && g.region == guard.region
                    }) {
                        Some(existing) => *existing = guard,
                        None => s.guards.guards.push(guard),
                    }
                })?;
                Ok(OperationResult::PolicyUpdatedResult { version, detail })
            }

            QuoteOperation::NormalizeCatalog => {
                let catalog = self.store.catalog_mut().ok_or(BridgeError::NoCatalog)?;
                let duplicates_removed = dedupe_questions(catalog);
                let universal_added = merge_universal_questions(catalog);
                renumber_display_order(catalog);
                catalog.validate()?;
                log::info!(
                    "catalog normalized: {universal_added} universal added, \
                     {duplicates_removed} duplicates removed"
                );
                Ok(OperationResult::CatalogNormalizedResult {
                    universal_added,
                    duplicates_removed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_catalog::{Question, QuestionCatalog, QuestionType, UseCaseTemplate};
    use merlin_pipeline::types::QuoteLineItem;
    use merlin_policy::bands::BandTable;
    use merlin_policy::guards::GuardTable;

    fn band(id: &str, min: f64, max: Option<f64>) -> MarginBand {
        MarginBand {
            id: id.into(),
            min_total: min,
            max_total: max,
            margin_min: 0.15,
            margin_max: 0.20,
            margin_target: 0.18,
            description: String::new(),
        }
    }

    fn snapshot() -> PolicySnapshot {
        PolicySnapshot {
            version: "2026-08.v3".into(),
            bands: BandTable::from_bands(vec![
                band("small", 0.0, Some(1_000_000.0)),
                band("large", 1_000_000.0, None),
            ])
            .unwrap(),
            product_policies: vec![ProductClassPolicy {
                product_class: "bess".into(),
                margin_multiplier: 1.0,
                is_additive: false,
                fixed_adder: 0.0,
            }],
            risk_adjusters: vec![RiskAdjuster {
                risk_level: "standard".into(),
                margin_add_percent: 0.0,
            }],
            segment_adjusters: vec![SegmentAdjuster {
                segment: "direct".into(),
                margin_multiplier: 1.0,
            }],
            guards: GuardTable {
                guards: vec![PriceGuard {
                    product_class: "bess".into(),
                    unit: "kwh".into(),
                    region: None,
                    floor_price: 100.0,
                    ceiling_price: 400.0,
                    last_market_price: None,
                }],
            },
            price_tiers: Default::default(),
        }
    }

    fn catalog() -> QuestionCatalog {
        QuestionCatalog {
            use_cases: vec![UseCaseTemplate {
                use_case: "cold_storage".into(),
                display_name: "Cold Storage".into(),
                questions: vec![Question {
                    field_name: "refrigeration_load".into(),
                    question_text: "Refrigeration load (kW)".into(),
                    question_type: QuestionType::Number,
                    options: vec![],
                    unit: Some("kW".into()),
                    default_value: None,
                    help_text: String::new(),
                    is_required: true,
                    display_order: 1,
                }],
            }],
        }
    }

    fn make_request(op: QuoteOperation) -> BridgeRequest {
        BridgeRequest {
            operation: op,
            request_id: "req-001".into(),
            context: None,
        }
    }

    fn quote_request() -> QuoteRequest {
        QuoteRequest {
            request_id: "q-100".into(),
            total_base_cost: 200_000.0,
            line_items: vec![QuoteLineItem {
                product_class: "bess".into(),
                unit: "kwh".into(),
                quantity: Some(1_000.0),
                base_cost: Some(200_000.0),
                description: String::new(),
            }],
            risk_level: None,
            customer_segment: None,
            policy_version: None,
            region: None,
            resolved_band: None,
        }
    }

    #[test]
    fn test_parse_valid_request() {
        let bridge = Bridge::new(snapshot()).unwrap();
        let json = r#"{
            "operation": {"op": "ListBands"},
            "request_id": "req-001",
            "context": "admin console"
        }"#;
        assert!(bridge.parse_request(json).is_ok());
    }

    #[test]
    fn test_reject_invalid_json() {
        let bridge = Bridge::new(snapshot()).unwrap();
        assert!(bridge.parse_request("not json at all").is_err());
    }

    #[test]
    fn test_reject_out_of_range_audit_page() {
        let bridge = Bridge::new(snapshot()).unwrap();
        let err = bridge
            .validate_operation(&QuoteOperation::ListAuditEntries { limit: 99_999 })
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidParameter { .. }));
    }

    #[test]
    fn test_reject_empty_quote() {
        let bridge = Bridge::new(snapshot()).unwrap();
        let mut request = quote_request();
        request.line_items.clear();
        let err = bridge
            .validate_operation(&QuoteOperation::ComputeQuote { request })
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_compute_quote_round_trip() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        let request = make_request(QuoteOperation::ComputeQuote {
            request: quote_request(),
        });

        let response = bridge.process(&request).await.unwrap();
        assert_eq!(response.request_id, "req-001");
        assert!(!response.read_only);
        assert_eq!(response.policy_version, "2026-08.v3");

        let quote = match response.result {
            OperationResult::QuoteResult { quote } => quote,
            other => panic!("expected QuoteResult, got {other:?}"),
        };
        assert_eq!(quote.band_id, "small");
        assert_eq!(quote.lines.len(), 1);
        // $200,000 at margin 0.18 -> $243.90/kWh, inside the guard.
        assert!(quote.clamp_events.is_empty());
        assert!((quote.blended_margin - 0.18).abs() < 1e-3);
        let entry_id = quote.audit_entry_id.expect("audit entry recorded");
        assert_eq!(bridge.store().audit.get(&entry_id).unwrap().request_id, "q-100");
    }

    #[tokio::test]
    async fn test_stale_policy_version_rejected() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        let mut quote = quote_request();
        quote.policy_version = Some("2020-01.v1".into());
        let request = make_request(QuoteOperation::ComputeQuote { request: quote });

        let err = bridge.process(&request).await.unwrap_err();
        assert!(matches!(err, BridgeError::UnknownPolicyVersion { .. }));
        // The failure is still recorded in the ops audit.
        assert_eq!(bridge.ops_audit.len(), 1);
        assert!(!bridge.ops_audit[0].success);
    }

    #[tokio::test]
    async fn test_mutation_bumps_version() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        let request = make_request(QuoteOperation::UpsertRiskAdjuster {
            adjuster: RiskAdjuster {
                risk_level: "elevated".into(),
                margin_add_percent: 0.02,
            },
        });

        let response = bridge.process(&request).await.unwrap();
        assert_eq!(response.policy_version, "2026-08.v3.r1");
        assert!(bridge.store().snapshot().risk_adjuster("elevated").is_some());

        let entry = &bridge.ops_audit[0];
        assert_eq!(entry.version_before, "2026-08.v3");
        assert_eq!(entry.version_after, "2026-08.v3.r1");
        assert!(entry.success);
    }

    #[tokio::test]
    async fn test_breaking_edit_rejected_wholesale() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        // Removing the top band would leave the table without an
        // unbounded tail; the edit must be rejected and the version kept.
        let request = make_request(QuoteOperation::RemoveBand { id: "large".into() });

        let err = bridge.process(&request).await.unwrap_err();
        assert!(matches!(err, BridgeError::Policy(_)));
        assert_eq!(bridge.store().active_version(), "2026-08.v3");
        assert_eq!(bridge.store().snapshot().bands.len(), 2);
        assert!(!bridge.ops_audit[0].success);
    }

    #[tokio::test]
    async fn test_upsert_band_replaces_by_id() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        let mut edited = band("small", 0.0, Some(1_000_000.0));
        edited.margin_target = 0.17;
        let request = make_request(QuoteOperation::UpsertBand { band: edited });

        bridge.process(&request).await.unwrap();
        let snapshot = bridge.store().snapshot();
        assert_eq!(snapshot.bands.len(), 2);
        assert!((snapshot.bands.get("small").unwrap().margin_target - 0.17).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_questionnaire_and_normalization() {
        let mut bridge = Bridge::with_catalog(snapshot(), catalog()).unwrap();

        let response = bridge
            .process(&make_request(QuoteOperation::NormalizeCatalog))
            .await
            .unwrap();
        match response.result {
            OperationResult::CatalogNormalizedResult {
                universal_added,
                duplicates_removed,
            } => {
                assert_eq!(universal_added, 5);
                assert_eq!(duplicates_removed, 0);
            }
            other => panic!("expected CatalogNormalizedResult, got {other:?}"),
        }

        let response = bridge
            .process(&make_request(QuoteOperation::GetQuestionnaire {
                use_case: "cold_storage".into(),
            }))
            .await
            .unwrap();
        match response.result {
            OperationResult::QuestionnaireResult { questions, .. } => {
                assert_eq!(questions.len(), 6);
                assert!(questions.iter().any(|q| q.field_name == "grid_connection"));
            }
            other => panic!("expected QuestionnaireResult, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_questionnaire_without_catalog_rejected() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        let err = bridge
            .process(&make_request(QuoteOperation::GetQuestionnaire {
                use_case: "cold_storage".into(),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NoCatalog));
    }

    #[tokio::test]
    async fn test_ops_audit_populated_for_reads() {
        let mut bridge = Bridge::new(snapshot()).unwrap();
        let request = make_request(QuoteOperation::ResolveBand {
            total_base_cost: 750_000.0,
        });
        let response = bridge.process(&request).await.unwrap();
        assert!(response.read_only);
        match response.result {
            OperationResult::BandResult { band } => assert_eq!(band.id, "small"),
            other => panic!("expected BandResult, got {other:?}"),
        }
        assert_eq!(bridge.ops_audit.len(), 1);
        assert!(bridge.ops_audit[0].read_only);
        assert!(bridge.ops_audit[0].success);
    }
}
