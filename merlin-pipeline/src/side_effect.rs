use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StageError;
use crate::pricing_pipeline::short_type_name;

/// Input provided to side effects after the pipeline completes selection.
#[derive(Clone)]
pub struct SideEffectInput<Q, C> {
    pub query: Arc<Q>,
    pub selected_candidates: Vec<C>,
}

/// A side effect runs after selection and does not affect the pricing
/// result. The audit trail is one: its failure is logged, never allowed
/// to change or abort an already-computed quote.
#[async_trait]
pub trait SideEffect<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this side effect should run.
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    /// Execute the side effect.
    async fn run(&self, input: Arc<SideEffectInput<Q, C>>) -> Result<(), StageError>;

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}
