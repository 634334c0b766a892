//! Bridge error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use merlin_catalog::CatalogError;
use merlin_pipeline::PipelineError;
use merlin_policy::PolicyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid parameter for {op}: {reason}")]
    InvalidParameter { op: String, reason: String },

    #[error("Unknown policy version '{requested}' (active is '{active}')")]
    UnknownPolicyVersion { requested: String, active: String },

    #[error("Band not found: {0}")]
    UnknownBand(String),

    #[error("Product policy not found: {0}")]
    UnknownProductPolicy(String),

    #[error("Price guard not found: {product_class}/{unit}")]
    UnknownPriceGuard { product_class: String, unit: String },

    #[error("Audit entry not found: {0}")]
    UnknownAuditEntry(String),

    #[error("Use case not found: {0}")]
    UnknownUseCase(String),

    #[error("No questionnaire catalog is loaded")]
    NoCatalog,

    #[error("Policy rejected: {0}")]
    Policy(#[from] PolicyError),

    #[error("Pricing failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Catalog rejected: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
