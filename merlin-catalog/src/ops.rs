//! Catalog normalization operations.
//!
//! Idempotent maintenance passes run by administrators when templates
//! drift: merging in missing universal questions, deduplicating by field
//! name, and closing display-order gaps.

use std::collections::HashSet;

use crate::types::QuestionCatalog;
use crate::universal::universal_questions;

/// Append the universal questions to every use case that lacks them,
/// keyed by field name. Idempotent: a second run adds nothing.
/// Returns the number of questions added.
pub fn merge_universal_questions(catalog: &mut QuestionCatalog) -> usize {
    let mut added = 0;
    for template in &mut catalog.use_cases {
        let existing: HashSet<String> = template
            .questions
            .iter()
            .map(|q| q.field_name.clone())
            .collect();
        let base = template
            .questions
            .iter()
            .map(|q| q.display_order)
            .max()
            .unwrap_or(0);

        for question in universal_questions(base) {
            if !existing.contains(&question.field_name) {
                template.questions.push(question);
                added += 1;
            }
        }
    }
    added
}

/// Per use case, keep only the lowest-display_order question per field
/// name. Returns the number of duplicates removed.
pub fn dedupe_questions(catalog: &mut QuestionCatalog) -> usize {
    let mut removed = 0;
    for template in &mut catalog.use_cases {
        template
            .questions
            .sort_by_key(|q| q.display_order);
        let mut seen: HashSet<String> = HashSet::new();
        let before = template.questions.len();
        template
            .questions
            .retain(|q| seen.insert(q.field_name.clone()));
        removed += before - template.questions.len();
    }
    removed
}

/// Renumber display orders to 1..=n per use case, preserving relative
/// order.
pub fn renumber_display_order(catalog: &mut QuestionCatalog) {
    for template in &mut catalog.use_cases {
        template.questions.sort_by_key(|q| q.display_order);
        for (i, question) in template.questions.iter_mut().enumerate() {
            question.display_order = (i + 1) as u32;
        }
    }
}
