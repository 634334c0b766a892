use async_trait::async_trait;
use std::sync::Arc;

use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::thresholds::{DEFAULT_RISK_LEVEL, DEFAULT_SEGMENT};

use crate::error::StageError;
use crate::query_hydrator::QueryHydrator;
use crate::types::QuoteRequest;

/// Fills in the policy defaults a caller may omit: risk level, customer
/// segment, and the active policy version.
pub struct PolicyDefaultsQueryHydrator {
    snapshot: Arc<PolicySnapshot>,
}

impl PolicyDefaultsQueryHydrator {
    pub fn new(snapshot: Arc<PolicySnapshot>) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl QueryHydrator<QuoteRequest> for PolicyDefaultsQueryHydrator {
    async fn hydrate(&self, query: &QuoteRequest) -> Result<QuoteRequest, StageError> {
        Ok(QuoteRequest {
            risk_level: Some(
                query
                    .risk_level
                    .clone()
                    .unwrap_or_else(|| DEFAULT_RISK_LEVEL.to_string()),
            ),
            customer_segment: Some(
                query
                    .customer_segment
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SEGMENT.to_string()),
            ),
            policy_version: Some(
                query
                    .policy_version
                    .clone()
                    .unwrap_or_else(|| self.snapshot.version.clone()),
            ),
            ..query.clone()
        })
    }

    fn update(&self, query: &mut QuoteRequest, hydrated: QuoteRequest) {
        query.risk_level = hydrated.risk_level;
        query.customer_segment = hydrated.customer_segment;
        query.policy_version = hydrated.policy_version;
    }
}
