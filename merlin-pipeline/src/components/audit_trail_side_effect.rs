use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use merlin_policy::audit::{AuditLog, MarginAuditEntry};
use merlin_policy::pricing::{realized_margin, round_cents};
use merlin_policy::thresholds::{DEFAULT_RISK_LEVEL, DEFAULT_SEGMENT};

use crate::error::StageError;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{PricedLine, QuoteRequest};

/// Persists one immutable `MarginAuditEntry` per quote computation:
/// inputs, the resolved band and adjuster identifiers, every clamp event,
/// the blended margin, and the policy version active at computation time.
pub struct AuditTrailSideEffect {
    audit: Arc<AuditLog>,
}

impl AuditTrailSideEffect {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl SideEffect<QuoteRequest, PricedLine> for AuditTrailSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<QuoteRequest, PricedLine>>,
    ) -> Result<(), StageError> {
        let query = &input.query;
        let lines = &input.selected_candidates;

        let priced_base: f64 = lines.iter().map(|l| l.base_cost).sum();
        let total_sell: f64 = lines.iter().filter_map(|l| l.sell_price).sum();

        let clamp_events = lines
            .iter()
            .filter_map(|l| l.clamp_event.clone())
            .collect::<Vec<_>>();

        let mut warnings: Vec<String> = lines.iter().flat_map(|l| l.warnings.clone()).collect();
        warnings.sort();
        warnings.dedup();

        let entry = MarginAuditEntry {
            entry_id: String::new(),
            request_id: query.request_id.clone(),
            policy_version: query.policy_version.clone().unwrap_or_default(),
            recorded_at: Utc::now().to_rfc3339(),
            total_base_cost: query.total_base_cost,
            total_sell_price: round_cents(total_sell),
            blended_margin: realized_margin(priced_base, total_sell),
            band_id: query
                .resolved_band
                .as_ref()
                .map(|b| b.id.clone())
                .unwrap_or_default(),
            risk_level: query
                .risk_level
                .clone()
                .unwrap_or_else(|| DEFAULT_RISK_LEVEL.to_string()),
            segment: query
                .customer_segment
                .clone()
                .unwrap_or_else(|| DEFAULT_SEGMENT.to_string()),
            line_count: lines.len(),
            clamp_events,
            warnings,
        };

        let entry_id = self.audit.append(entry);
        log::info!(
            "request_id={} audit entry {} recorded ({} lines, {} clamps)",
            query.request_id,
            entry_id,
            lines.len(),
            lines.iter().filter(|l| l.clamp_event.is_some()).count()
        );
        Ok(())
    }
}
