use async_trait::async_trait;

use crate::error::StageError;
use crate::filter::{Filter, FilterResult};
use crate::types::{PricedLine, QuoteRequest};

/// Removes lines with nothing to price: zero quantity or a zero base
/// cost. Removed lines appear in the pipeline result's filtered set, so
/// callers can see what was excluded and why.
#[derive(Default)]
pub struct EmptyLineFilter;

#[async_trait]
impl Filter<QuoteRequest, PricedLine> for EmptyLineFilter {
    async fn filter(
        &self,
        _query: &QuoteRequest,
        candidates: Vec<PricedLine>,
    ) -> Result<FilterResult<PricedLine>, StageError> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|line| line.quantity > 0.0 && line.base_cost > 0.0);

        Ok(FilterResult { kept, removed })
    }
}
