//! The pipeline skeleton: stage ordering and orchestration.
//!
//! `execute()` runs the stages in a fixed order. Stage failures abort the
//! run (configuration and validation errors must surface, never default);
//! side-effect failures are logged and swallowed because they cannot
//! change the pricing result.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::source::Source;

/// Extract a short type name from the full module path.
///
/// Given `"my_crate::some_module::MyType"`, returns `"MyType"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Queries that carry a request id for logging and audit correlation.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Everything a pipeline run produced, including what was dropped.
#[derive(Debug, Clone)]
pub struct PipelineResult<Q, C> {
    /// The query after all query hydrators ran.
    pub query: Q,
    /// Candidates as emitted by the sources.
    pub retrieved_candidates: Vec<C>,
    /// Candidates removed by filters (reported, never silently dropped).
    pub filtered_candidates: Vec<C>,
    /// The final, priced candidates.
    pub selected_candidates: Vec<C>,
}

/// A pricing pipeline: pluggable components per stage, orchestrated by
/// the default `execute()`.
#[async_trait]
pub trait QuotePipeline<Q, C>: Send + Sync
where
    Q: Clone + HasRequestId + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<Q>>];
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];
    fn hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn scorers(&self) -> &[Box<dyn Scorer<Q, C>>];
    fn selector(&self) -> &dyn Selector<Q, C>;
    fn post_selection_hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn post_selection_filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<Q, C>>>>;

    /// Run the full pipeline for one query.
    async fn execute(&self, query: Q) -> Result<PipelineResult<Q, C>, PipelineError> {
        let mut query = query;

        for qh in self.query_hydrators() {
            if !qh.enable(&query) {
                continue;
            }
            let hydrated = qh
                .hydrate(&query)
                .await
                .map_err(|e| PipelineError::new(qh.name(), e))?;
            qh.update(&mut query, hydrated);
        }

        let mut retrieved: Vec<C> = Vec::new();
        for source in self.sources() {
            if !source.enable(&query) {
                continue;
            }
            let candidates = source
                .get_candidates(&query)
                .await
                .map_err(|e| PipelineError::new(source.name(), e))?;
            retrieved.extend(candidates);
        }

        let mut candidates = retrieved.clone();
        for hydrator in self.hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            let hydrated = hydrator
                .hydrate(&query, &candidates)
                .await
                .map_err(|e| PipelineError::new(hydrator.name(), e))?;
            for (candidate, h) in candidates.iter_mut().zip(hydrated) {
                hydrator.update(candidate, h);
            }
        }

        let mut filtered: Vec<C> = Vec::new();
        for filter in self.filters() {
            if !filter.enable(&query) {
                continue;
            }
            let result = filter
                .filter(&query, candidates)
                .await
                .map_err(|e| PipelineError::new(filter.name(), e))?;
            filtered.extend(result.removed);
            candidates = result.kept;
        }

        // The scorers run strictly in declaration order; for quote pricing
        // that order IS the margin layering contract.
        for scorer in self.scorers() {
            if !scorer.enable(&query) {
                continue;
            }
            let scored = scorer
                .score(&query, &candidates)
                .await
                .map_err(|e| PipelineError::new(scorer.name(), e))?;
            for (candidate, s) in candidates.iter_mut().zip(scored) {
                scorer.update(candidate, s);
            }
        }

        let mut selected = self.selector().select(&query, candidates);

        for hydrator in self.post_selection_hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            let hydrated = hydrator
                .hydrate(&query, &selected)
                .await
                .map_err(|e| PipelineError::new(hydrator.name(), e))?;
            for (candidate, h) in selected.iter_mut().zip(hydrated) {
                hydrator.update(candidate, h);
            }
        }

        for filter in self.post_selection_filters() {
            if !filter.enable(&query) {
                continue;
            }
            let result = filter
                .filter(&query, selected)
                .await
                .map_err(|e| PipelineError::new(filter.name(), e))?;
            filtered.extend(result.removed);
            selected = result.kept;
        }

        let input = Arc::new(SideEffectInput {
            query: Arc::new(query.clone()),
            selected_candidates: selected.clone(),
        });
        for side_effect in self.side_effects().iter() {
            if !side_effect.enable(Arc::clone(&input.query)) {
                continue;
            }
            if let Err(e) = side_effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} side effect {} failed: {}",
                    query.request_id(),
                    side_effect.name(),
                    e
                );
            }
        }

        Ok(PipelineResult {
            query,
            retrieved_candidates: retrieved,
            filtered_candidates: filtered,
            selected_candidates: selected,
        })
    }
}
