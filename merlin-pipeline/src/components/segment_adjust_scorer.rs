use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::adjust::segment_adjusted;
use merlin_policy::thresholds::DEFAULT_SEGMENT;

use crate::error::StageError;
use crate::scorer::Scorer;
use crate::types::{PricedLine, QuoteRequest};

/// Margin layer 3: the multiplicative customer-segment effect, applied
/// last. EPC partners and government buyers carry different economics
/// than direct customers; this layer encodes that relationship discount
/// or premium.
pub struct SegmentAdjustScorer {
    snapshot: Arc<PolicySnapshot>,
}

impl SegmentAdjustScorer {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Scorer<QuoteRequest, PricedLine> for SegmentAdjustScorer {
    async fn score(
        &self,
        query: &QuoteRequest,
        candidates: &[PricedLine],
    ) -> Result<Vec<PricedLine>, StageError> {
        let segment = query
            .customer_segment
            .as_deref()
            .unwrap_or(DEFAULT_SEGMENT);
        let adjuster = self.snapshot.segment_adjuster(segment);
        if adjuster.is_none() {
            log::warn!("no segment adjuster for '{segment}'; x1.0 applied");
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for line in candidates {
            let margin = line
                .margin_after_risk
                .ok_or(StageError::IncompleteCandidate {
                    line_index: line.line_index,
                    field: "margin_after_risk",
                })?;
            let warnings = if adjuster.is_none() {
                vec![format!("no segment adjuster for '{segment}'; x1.0 applied")]
            } else {
                Vec::new()
            };
            scored.push(PricedLine {
                margin_after_segment: Some(segment_adjusted(margin, adjuster)),
                warnings,
                ..PricedLine::default()
            });
        }
        Ok(scored)
    }

    fn update(&self, candidate: &mut PricedLine, scored: PricedLine) {
        candidate.margin_after_segment = scored.margin_after_segment;
        candidate.warnings.extend(scored.warnings);
    }
}
