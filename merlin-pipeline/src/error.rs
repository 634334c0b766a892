//! Pipeline error types.

use merlin_policy::PolicyError;
use thiserror::Error;

/// Failure inside a single stage component.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// A policy-level failure (configuration or validation).
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A candidate reached a stage without a field an earlier stage was
    /// supposed to populate. Always a wiring bug, never a data problem.
    #[error("line {line_index} is missing '{field}' from an earlier stage")]
    IncompleteCandidate {
        line_index: usize,
        field: &'static str,
    },
}

/// Failure of a pipeline run, tagged with the stage that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct PipelineError {
    pub stage: String,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: &str, source: StageError) -> Self {
        Self {
            stage: stage.to_string(),
            source,
        }
    }

    /// Was the underlying failure a policy configuration error?
    pub fn is_configuration(&self) -> bool {
        matches!(&self.source, StageError::Policy(p) if p.is_configuration())
    }

    /// Was the underlying failure caller-input validation?
    pub fn is_validation(&self) -> bool {
        matches!(&self.source, StageError::Policy(p) if p.is_validation())
    }
}
