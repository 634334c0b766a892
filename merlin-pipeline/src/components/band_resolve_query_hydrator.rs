use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::snapshot::PolicySnapshot;

use crate::error::StageError;
use crate::query_hydrator::QueryHydrator;
use crate::types::QuoteRequest;

/// Resolves the deal-size margin band from the request's total base cost
/// and attaches it to the query.
///
/// A failed resolution aborts the pipeline: a gap in the band table is a
/// configuration error and a negative total is a validation error; neither
/// is ever defaulted.
pub struct BandResolveQueryHydrator {
    snapshot: Arc<PolicySnapshot>,
}

impl BandResolveQueryHydrator {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl QueryHydrator<QuoteRequest> for BandResolveQueryHydrator {
    async fn hydrate(&self, query: &QuoteRequest) -> Result<QuoteRequest, StageError> {
        let band = self.snapshot.bands.resolve(query.total_base_cost)?;
        Ok(QuoteRequest {
            resolved_band: Some(band.clone()),
            ..query.clone()
        })
    }

    fn update(&self, query: &mut QuoteRequest, hydrated: QuoteRequest) {
        query.resolved_band = hydrated.resolved_band;
    }
}
