use async_trait::async_trait;

use crate::error::StageError;
use crate::pricing_pipeline::short_type_name;

/// Sources turn the hydrated quote request into priceable candidates.
#[async_trait]
pub trait Source<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this source should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Produce candidates for the given query. Malformed line items are
    /// rejected here, before any pricing arithmetic runs.
    async fn get_candidates(&self, query: &Q) -> Result<Vec<C>, StageError>;

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}
