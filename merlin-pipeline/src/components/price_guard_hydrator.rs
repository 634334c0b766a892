use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::error::PolicyError;
use merlin_policy::pricing::{round_cents, sell_price};
use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::thresholds::MAX_MARGIN;

use crate::error::StageError;
use crate::hydrator::Hydrator;
use crate::types::{PricedLine, QuoteRequest};

/// Computes sell prices from the final margin and clamps the unit price
/// against the floor/ceiling guard for the line's product class, unit and
/// region.
///
/// Clamping is silent to the end customer but every clamp is recorded on
/// the line and flows into the audit entry. A missing guard skips
/// clamping with a logged, recorded warning.
pub struct PriceGuardHydrator {
    snapshot: Arc<PolicySnapshot>,
}

impl PriceGuardHydrator {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Hydrator<QuoteRequest, PricedLine> for PriceGuardHydrator {
    async fn hydrate(
        &self,
        query: &QuoteRequest,
        candidates: &[PricedLine],
    ) -> Result<Vec<PricedLine>, StageError> {
        let region = query.region.as_deref();

        let mut hydrated = Vec::with_capacity(candidates.len());
        for line in candidates {
            let margin = line
                .margin_after_segment
                .ok_or(StageError::IncompleteCandidate {
                    line_index: line.line_index,
                    field: "margin_after_segment",
                })?;

            // Stacked adjusters are individually unbounded; the final
            // margin must still stay clear of the sell-price pole.
            if !margin.is_finite() || margin >= MAX_MARGIN {
                return Err(PolicyError::InvalidMargin {
                    context: format!("line {} final margin", line.line_index),
                    value: margin,
                }
                .into());
            }

            let line_sell = sell_price(line.base_cost, margin);
            let unit_price = round_cents(line_sell / line.quantity);

            let mut warnings = Vec::new();
            let (final_unit_price, clamp_event) =
                match self
                    .snapshot
                    .guards
                    .lookup(&line.product_class, &line.unit, region)
                {
                    Some(guard) => guard.clamp(unit_price),
                    None => {
                        log::warn!(
                            "no price guard for {}/{}; clamping skipped",
                            line.product_class,
                            line.unit
                        );
                        warnings.push(format!(
                            "no price guard for {}/{}; clamping skipped",
                            line.product_class, line.unit
                        ));
                        (unit_price, None)
                    }
                };

            hydrated.push(PricedLine {
                unit_sell_price: Some(final_unit_price),
                sell_price: Some(round_cents(final_unit_price * line.quantity)),
                clamp_event,
                warnings,
                ..PricedLine::default()
            });
        }
        Ok(hydrated)
    }

    fn update(&self, candidate: &mut PricedLine, hydrated: PricedLine) {
        candidate.unit_sell_price = hydrated.unit_sell_price;
        candidate.sell_price = hydrated.sell_price;
        candidate.clamp_event = hydrated.clamp_event;
        candidate.warnings.extend(hydrated.warnings);
    }
}
