use crate::selector::Selector;
use crate::types::{PricedLine, QuoteRequest};

/// Orders lines exactly as they appeared in the request, with no
/// truncation. Quote output must be deterministic and positionally stable
/// for the caller, so "selection" here is purely an ordering guarantee.
#[derive(Default)]
pub struct QuoteOrderSelector;

impl Selector<QuoteRequest, PricedLine> for QuoteOrderSelector {
    fn score(&self, candidate: &PricedLine) -> f64 {
        // Descending sort + negated index = original request order.
        -(candidate.line_index as f64)
    }
}
