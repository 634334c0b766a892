use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::adjust::product_adjusted;
use merlin_policy::snapshot::PolicySnapshot;

use crate::error::StageError;
use crate::scorer::Scorer;
use crate::types::{PricedLine, QuoteRequest};

/// Margin layer 1: the product-class effect on the band's target margin.
///
/// Multiplicative policies scale the target; additive policies add their
/// fixed adder on top of the raw target. A product class with no policy
/// falls back to multiplier 1.0 with a recorded warning, the one fallback
/// the pricing contract allows.
pub struct ProductClassScorer {
    snapshot: Arc<PolicySnapshot>,
}

impl ProductClassScorer {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Scorer<QuoteRequest, PricedLine> for ProductClassScorer {
    async fn score(
        &self,
        _query: &QuoteRequest,
        candidates: &[PricedLine],
    ) -> Result<Vec<PricedLine>, StageError> {
        let mut scored = Vec::with_capacity(candidates.len());
        for line in candidates {
            let target = line.band_target.ok_or(StageError::IncompleteCandidate {
                line_index: line.line_index,
                field: "band_target",
            })?;

            let policy = self.snapshot.product_policy(&line.product_class);
            let mut warnings = Vec::new();
            if policy.is_none() {
                log::warn!(
                    "no product policy for '{}'; multiplier 1.0 applied",
                    line.product_class
                );
                warnings.push(format!(
                    "no product policy for '{}'; multiplier 1.0 applied",
                    line.product_class
                ));
            }

            scored.push(PricedLine {
                margin_after_product: Some(product_adjusted(target, policy)),
                warnings,
                ..PricedLine::default()
            });
        }
        Ok(scored)
    }

    fn update(&self, candidate: &mut PricedLine, scored: PricedLine) {
        candidate.margin_after_product = scored.margin_after_product;
        candidate.warnings.extend(scored.warnings);
    }
}
