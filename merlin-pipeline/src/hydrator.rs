use async_trait::async_trait;

use crate::error::StageError;
use crate::pricing_pipeline::short_type_name;

/// Hydrators enrich candidates with derived fields (sell prices, clamp
/// events) without removing or reordering them.
#[async_trait]
pub trait Hydrator<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this hydrator should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Hydrate the candidates. The returned vector must be positionally
    /// aligned with the input slice.
    async fn hydrate(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, StageError>;

    /// Copy only the fields this hydrator is responsible for into the
    /// candidate.
    fn update(&self, candidate: &mut C, hydrated: C);

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}
