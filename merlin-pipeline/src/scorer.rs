use async_trait::async_trait;

use crate::error::StageError;
use crate::pricing_pipeline::short_type_name;

/// Scorers apply one margin layer each and run strictly in declaration
/// order: product class first (intrinsic commodity pricing), then risk
/// (project-specific), then segment (commercial relationship). Each layer
/// is well-defined only given the prior layer's output, so the ordering
/// is part of the pricing contract, not an implementation detail.
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this scorer should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Score the candidates. The returned vector must be positionally
    /// aligned with the input slice; only this scorer's fields need to be
    /// populated on the returned candidates.
    async fn score(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, StageError>;

    /// Copy only the fields this scorer is responsible for into the
    /// candidate.
    fn update(&self, candidate: &mut C, scored: C);

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}
