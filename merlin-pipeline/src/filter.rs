use async_trait::async_trait;

use crate::error::StageError;
use crate::pricing_pipeline::short_type_name;

/// Result of a filter operation, partitioning candidates into kept and
/// removed. Removed candidates are carried through to the pipeline result
/// so nothing disappears silently.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

/// Filters run sequentially and partition candidates into kept and removed
/// sets.
#[async_trait]
pub trait Filter<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this filter should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Partition candidates. Kept candidates continue to the next stage;
    /// removed candidates are excluded from pricing but reported.
    async fn filter(&self, query: &Q, candidates: Vec<C>) -> Result<FilterResult<C>, StageError>;

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}
