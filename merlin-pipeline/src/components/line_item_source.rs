use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::error::PolicyError;
use merlin_policy::pricing::round_cents;
use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::thresholds::DEFAULT_QUANTITY;

use crate::error::StageError;
use crate::source::Source;
use crate::types::{PricedLine, QuoteRequest};

/// Emits one `PricedLine` candidate per request line item.
///
/// Base costs the caller omitted are derived from the size-tiered unit
/// pricing tables (quantity × tier unit price) and flagged with a
/// warning so the derivation shows up in the audit trail. Malformed
/// quantities and costs are rejected here, before any margin arithmetic.
pub struct LineItemSource {
    snapshot: Arc<PolicySnapshot>,
}

impl LineItemSource {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Source<QuoteRequest, PricedLine> for LineItemSource {
    fn enable(&self, query: &QuoteRequest) -> bool {
        !query.line_items.is_empty()
    }

    async fn get_candidates(&self, query: &QuoteRequest) -> Result<Vec<PricedLine>, StageError> {
        let band = query.resolved_band.as_ref().ok_or(StageError::IncompleteCandidate {
            line_index: 0,
            field: "resolved_band",
        })?;

        let mut lines = Vec::with_capacity(query.line_items.len());
        for (index, item) in query.line_items.iter().enumerate() {
            let quantity = item.quantity.unwrap_or(DEFAULT_QUANTITY);
            if !quantity.is_finite() || quantity < 0.0 {
                return Err(PolicyError::InvalidLineItem {
                    index,
                    product_class: item.product_class.clone(),
                    field: "quantity",
                    value: quantity,
                }
                .into());
            }

            let mut warnings = Vec::new();
            let base_cost = match item.base_cost {
                Some(cost) => {
                    if !cost.is_finite() || cost < 0.0 {
                        return Err(PolicyError::InvalidLineItem {
                            index,
                            product_class: item.product_class.clone(),
                            field: "base_cost",
                            value: cost,
                        }
                        .into());
                    }
                    cost
                }
                None => {
                    let unit_price = self.snapshot.price_tiers.unit_price_for(
                        &item.product_class,
                        &item.unit,
                        quantity,
                    )?;
                    warnings.push(format!(
                        "base cost derived from tier pricing at ${unit_price:.2}/{}",
                        item.unit
                    ));
                    round_cents(quantity * unit_price)
                }
            };

            lines.push(PricedLine {
                line_index: index,
                product_class: item.product_class.clone(),
                unit: item.unit.clone(),
                quantity,
                base_cost,
                description: item.description.clone(),
                band_id: Some(band.id.clone()),
                band_target: Some(band.margin_target),
                warnings,
                ..PricedLine::default()
            });
        }
        Ok(lines)
    }
}
