//! Questionnaire content catalog for the quoting wizard.
//!
//! Each industry use case carries an ordered list of questions (number,
//! select, boolean or text), some universal across every use case:
//! facility size, operating hours, peak load, grid connection quality and
//! grid capacity. The normalization operations here are the Rust form of
//! the content team's recurring maintenance passes: merging universal
//! questions into templates that lack them, deduplicating by field name,
//! and renumbering display order.

pub mod ops;
pub mod types;
pub mod universal;

pub use ops::{dedupe_questions, merge_universal_questions, renumber_display_order};
pub use types::{
    CatalogError, Question, QuestionCatalog, QuestionOption, QuestionType, UseCaseTemplate,
};
