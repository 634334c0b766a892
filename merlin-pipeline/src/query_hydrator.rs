use async_trait::async_trait;

use crate::error::StageError;
use crate::pricing_pipeline::short_type_name;

/// Query hydrators run before line-item sourcing and enrich the quote
/// request with resolved context (defaults, the deal-size band).
#[async_trait]
pub trait QueryHydrator<Q>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
{
    /// Decide if this query hydrator should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Hydrate the query. Returns a new query with this hydrator's fields
    /// populated; a configuration or validation failure aborts the run.
    async fn hydrate(&self, query: &Q) -> Result<Q, StageError>;

    /// Copy only the fields this hydrator is responsible for back into
    /// the query.
    fn update(&self, query: &mut Q, hydrated: Q);

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}
