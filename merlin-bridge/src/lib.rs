//! Quote Bridge — the contract between the margin engine and the
//! quote-generation system.
//!
//! Callers send JSON. The bridge parses that JSON into exactly one of N
//! valid operations, executes it against the versioned policy store, and
//! returns a structured result.
//!
//! The type system IS the contract:
//! - Every operation is an enum variant with validated parameters
//! - Every response is a structured type, not free-form text
//! - Invalid operations are rejected at parse time, not at runtime
//! - Policy mutations are validated wholesale; a broken table never
//!   replaces a working one
//!
//! Every processed request (read, computation, or admin edit) lands in
//! the operations audit trail.

pub mod error;
pub mod ops;
pub mod protocol;
pub mod response_validator;
pub mod state;

pub use error::BridgeError;
pub use ops::QuoteOperation;
pub use protocol::{Bridge, BridgeRequest, BridgeResponse, OperationResult, QuoteOutcome};
pub use response_validator::{validate_quote_document, CustomerQuoteDocument, ValidationResult};
pub use state::{PolicyStatus, PolicyStore};
