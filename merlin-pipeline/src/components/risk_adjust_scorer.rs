use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::adjust::risk_adjusted;
use merlin_policy::thresholds::DEFAULT_RISK_LEVEL;

use crate::error::StageError;
use crate::scorer::Scorer;
use crate::types::{PricedLine, QuoteRequest};

/// Margin layer 2: the additive risk percentage for the declared project
/// risk level. Runs after the product layer and before the segment layer.
pub struct RiskAdjustScorer {
    snapshot: Arc<PolicySnapshot>,
}

impl RiskAdjustScorer {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Scorer<QuoteRequest, PricedLine> for RiskAdjustScorer {
    async fn score(
        &self,
        query: &QuoteRequest,
        candidates: &[PricedLine],
    ) -> Result<Vec<PricedLine>, StageError> {
        let risk_level = query.risk_level.as_deref().unwrap_or(DEFAULT_RISK_LEVEL);
        let adjuster = self.snapshot.risk_adjuster(risk_level);
        if adjuster.is_none() {
            log::warn!("no risk adjuster for '{risk_level}'; +0.0 applied");
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for line in candidates {
            let margin = line
                .margin_after_product
                .ok_or(StageError::IncompleteCandidate {
                    line_index: line.line_index,
                    field: "margin_after_product",
                })?;
            let warnings = if adjuster.is_none() {
                vec![format!("no risk adjuster for '{risk_level}'; +0.0 applied")]
            } else {
                Vec::new()
            };
            scored.push(PricedLine {
                margin_after_risk: Some(risk_adjusted(margin, adjuster)),
                warnings,
                ..PricedLine::default()
            });
        }
        Ok(scored)
    }

    fn update(&self, candidate: &mut PricedLine, scored: PricedLine) {
        candidate.margin_after_risk = scored.margin_after_risk;
        candidate.warnings.extend(scored.warnings);
    }
}
