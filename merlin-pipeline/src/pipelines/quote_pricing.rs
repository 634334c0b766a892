use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::audit::AuditLog;
use merlin_policy::snapshot::PolicySnapshot;

use crate::components::audit_trail_side_effect::AuditTrailSideEffect;
use crate::components::band_resolve_query_hydrator::BandResolveQueryHydrator;
use crate::components::empty_line_filter::EmptyLineFilter;
use crate::components::line_item_source::LineItemSource;
use crate::components::policy_defaults_query_hydrator::PolicyDefaultsQueryHydrator;
use crate::components::price_guard_hydrator::PriceGuardHydrator;
use crate::components::product_class_scorer::ProductClassScorer;
use crate::components::quote_order_selector::QuoteOrderSelector;
use crate::components::risk_adjust_scorer::RiskAdjustScorer;
use crate::components::segment_adjust_scorer::SegmentAdjustScorer;
use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::pricing_pipeline::QuotePipeline;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::SideEffect;
use crate::source::Source;
use crate::types::{PricedLine, QuoteRequest};

/// The quote pricing pipeline.
///
/// Stage order is the pricing contract:
/// 1. PolicyDefaultsQueryHydrator fills risk/segment/version defaults
/// 2. BandResolveQueryHydrator resolves the deal-size band (abort on miss)
/// 3. LineItemSource emits candidates, deriving tiered base costs
/// 4. EmptyLineFilter drops zero lines (reported, not silent)
/// 5. ProductClassScorer applies margin layer 1
/// 6. RiskAdjustScorer applies margin layer 2
/// 7. SegmentAdjustScorer applies margin layer 3
/// 8. QuoteOrderSelector restores request order
/// 9. PriceGuardHydrator prices and clamps (post-selection)
/// 10. AuditTrailSideEffect records the computation
pub struct QuotePricingPipeline {
    query_hydrators: Vec<Box<dyn QueryHydrator<QuoteRequest>>>,
    sources: Vec<Box<dyn Source<QuoteRequest, PricedLine>>>,
    hydrators: Vec<Box<dyn Hydrator<QuoteRequest, PricedLine>>>,
    filters: Vec<Box<dyn Filter<QuoteRequest, PricedLine>>>,
    scorers: Vec<Box<dyn Scorer<QuoteRequest, PricedLine>>>,
    selector: QuoteOrderSelector,
    post_selection_hydrators: Vec<Box<dyn Hydrator<QuoteRequest, PricedLine>>>,
    post_selection_filters: Vec<Box<dyn Filter<QuoteRequest, PricedLine>>>,
    side_effects: Arc<Vec<Box<dyn SideEffect<QuoteRequest, PricedLine>>>>,
}

impl QuotePricingPipeline {
    /// Wire the standard pipeline against a validated policy snapshot and
    /// a shared audit log.
    pub fn new(snapshot: Arc<PolicySnapshot>, audit: Arc<AuditLog>) -> Self {
        let query_hydrators: Vec<Box<dyn QueryHydrator<QuoteRequest>>> = vec![
            Box::new(PolicyDefaultsQueryHydrator::new(Arc::clone(&snapshot))),
            Box::new(BandResolveQueryHydrator::new(Arc::clone(&snapshot))),
        ];

        let sources: Vec<Box<dyn Source<QuoteRequest, PricedLine>>> =
            vec![Box::new(LineItemSource::new(Arc::clone(&snapshot)))];

        let filters: Vec<Box<dyn Filter<QuoteRequest, PricedLine>>> =
            vec![Box::new(EmptyLineFilter)];

        // Declaration order here IS the margin layering: product, risk,
        // segment. Do not reorder.
        let scorers: Vec<Box<dyn Scorer<QuoteRequest, PricedLine>>> = vec![
            Box::new(ProductClassScorer::new(Arc::clone(&snapshot))),
            Box::new(RiskAdjustScorer::new(Arc::clone(&snapshot))),
            Box::new(SegmentAdjustScorer::new(Arc::clone(&snapshot))),
        ];

        let post_selection_hydrators: Vec<Box<dyn Hydrator<QuoteRequest, PricedLine>>> =
            vec![Box::new(PriceGuardHydrator::new(Arc::clone(&snapshot)))];

        let side_effects: Arc<Vec<Box<dyn SideEffect<QuoteRequest, PricedLine>>>> =
            Arc::new(vec![Box::new(AuditTrailSideEffect::new(audit))]);

        Self {
            query_hydrators,
            sources,
            hydrators: Vec::new(),
            filters,
            scorers,
            selector: QuoteOrderSelector,
            post_selection_hydrators,
            post_selection_filters: Vec::new(),
            side_effects,
        }
    }
}

#[async_trait]
impl QuotePipeline<QuoteRequest, PricedLine> for QuotePricingPipeline {
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<QuoteRequest>>] {
        &self.query_hydrators
    }

    fn sources(&self) -> &[Box<dyn Source<QuoteRequest, PricedLine>>] {
        &self.sources
    }

    fn hydrators(&self) -> &[Box<dyn Hydrator<QuoteRequest, PricedLine>>] {
        &self.hydrators
    }

    fn filters(&self) -> &[Box<dyn Filter<QuoteRequest, PricedLine>>] {
        &self.filters
    }

    fn scorers(&self) -> &[Box<dyn Scorer<QuoteRequest, PricedLine>>] {
        &self.scorers
    }

    fn selector(&self) -> &dyn Selector<QuoteRequest, PricedLine> {
        &self.selector
    }

    fn post_selection_hydrators(&self) -> &[Box<dyn Hydrator<QuoteRequest, PricedLine>>] {
        &self.post_selection_hydrators
    }

    fn post_selection_filters(&self) -> &[Box<dyn Filter<QuoteRequest, PricedLine>>] {
        &self.post_selection_filters
    }

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<QuoteRequest, PricedLine>>>> {
        Arc::clone(&self.side_effects)
    }
}
