//! Staged quote-pricing pipeline.
//!
//! A quote request flows through fixed stages: query hydration (defaults,
//! band resolution), line-item sourcing, filtering, the ordered margin
//! scorers (product, then risk, then segment), deterministic selection,
//! price-guard clamping, and finally the audit side effect. Each stage is
//! a trait with pluggable components, so alternate pricing pipelines can
//! be wired from the same parts.

pub mod components;
pub mod error;
pub mod filter;
pub mod hydrator;
pub mod pipelines;
pub mod policy_loader;
pub mod pricing_pipeline;
pub mod query_hydrator;
pub mod scorer;
pub mod selector;
pub mod side_effect;
pub mod source;
pub mod types;

pub use error::{PipelineError, StageError};
pub use pricing_pipeline::{PipelineResult, QuotePipeline};
pub use types::{PricedLine, QuoteLineItem, QuoteRequest};
