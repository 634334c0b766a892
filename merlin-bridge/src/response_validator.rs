//! Response validator — the output constraint layer.
//!
//! The ops enum constrains what callers send TO the engine. This module
//! constrains what the quote-generation system sends TO the customer.
//!
//! Margin policy is internal: clamping is applied silently and the
//! adjustment chain never appears on a customer document. Before a quote
//! renders, the document is validated here: internal pricing vocabulary,
//! broken totals, prices outside guard bounds, or a missing audit
//! reference all reject the document. Violations are never silently
//! dropped; rejected documents must be rebuilt from the engine's output.

use serde::{Deserialize, Serialize};

use merlin_policy::snapshot::PolicySnapshot;
use merlin_policy::thresholds::MONEY_EPSILON;

/// One customer-visible quote line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerQuoteLine {
    pub description: String,
    pub product_class: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// The document the customer sees. Built by the quote-generation system
/// from a `QuoteOutcome`; validated before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerQuoteDocument {
    pub request_id: String,
    /// Compliance reference to the margin audit entry. REQUIRED.
    pub audit_entry_id: Option<String>,
    /// Free-text summary shown to the customer.
    pub summary: String,
    pub lines: Vec<CustomerQuoteLine>,
    pub total_price: f64,
    /// Footnotes shown to the customer.
    pub notes: Vec<String>,
    /// Region the quote was priced for, if any.
    pub region: Option<String>,
}

/// Validation result.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub rule: &'static str,
    pub detail: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Severity {
    /// Document must be rejected and rebuilt.
    Reject,
    /// Document can proceed but the violation is logged.
    Warn,
}

/// Internal pricing vocabulary that must never reach a customer document.
/// This is not a style guideline; it is a string match that rejects the
/// document.
const INTERNAL_TERMS: &[&str] = &[
    "margin",
    "markup",
    "clamp",
    "floor price",
    "ceiling price",
    "price floor",
    "price ceiling",
    "margin band",
    "deal band",
    "adjuster",
    "multiplier",
    "risk level",
    "customer segment",
    "policy version",
    "blended",
];

fn scan_for_internal_terms(text: &str, rule: &'static str, where_: &str, violations: &mut Vec<Violation>) {
    let lower = text.to_lowercase();
    for term in INTERNAL_TERMS {
        if lower.contains(term) {
            violations.push(Violation {
                rule,
                detail: format!("{where_} contains internal pricing term '{term}'"),
                severity: Severity::Reject,
            });
        }
    }
}

/// Validate a customer quote document before it reaches the customer.
///
/// The policy snapshot is the one the quote was priced against; guard
/// bounds are re-checked so a document edited after pricing cannot leak
/// an out-of-bounds price.
pub fn validate_quote_document(
    document: &CustomerQuoteDocument,
    snapshot: &PolicySnapshot,
) -> ValidationResult {
    let mut violations = Vec::new();

    // ================================================================
    // RULE 1: No internal pricing vocabulary in customer-facing text
    // ================================================================
    scan_for_internal_terms(
        &document.summary,
        "NO_INTERNAL_PRICING_TERMS",
        "summary",
        &mut violations,
    );
    for note in &document.notes {
        scan_for_internal_terms(
            note,
            "NO_INTERNAL_PRICING_TERMS_IN_NOTE",
            "note",
            &mut violations,
        );
    }
    for line in &document.lines {
        scan_for_internal_terms(
            &line.description,
            "NO_INTERNAL_PRICING_TERMS_IN_LINE",
            "line description",
            &mut violations,
        );
    }

    // ================================================================
    // RULE 2: Audit reference is required
    // ================================================================
    if document.audit_entry_id.is_none() {
        violations.push(Violation {
            rule: "AUDIT_REFERENCE_REQUIRED",
            detail: "Document has no audit entry reference; every customer \
                     quote must be traceable to a recorded computation."
                .into(),
            severity: Severity::Reject,
        });
    }

    // ================================================================
    // RULE 3: Line arithmetic must hold
    // ================================================================
    for line in &document.lines {
        if line.quantity <= 0.0 || !line.quantity.is_finite() {
            violations.push(Violation {
                rule: "LINE_QUANTITY_POSITIVE",
                detail: format!(
                    "Line '{}' has non-positive quantity {}",
                    line.description, line.quantity
                ),
                severity: Severity::Reject,
            });
        }
        if line.unit_price <= 0.0 || line.line_total <= 0.0 {
            violations.push(Violation {
                rule: "LINE_PRICE_POSITIVE",
                detail: format!(
                    "Line '{}' has non-positive price",
                    line.description
                ),
                severity: Severity::Reject,
            });
        }
        let expected = line.unit_price * line.quantity;
        if (line.line_total - expected).abs() > MONEY_EPSILON + 0.01 {
            violations.push(Violation {
                rule: "LINE_TOTAL_MATH",
                detail: format!(
                    "Line '{}': total {:.2} doesn't match unit price {:.2} x quantity {}",
                    line.description, line.line_total, line.unit_price, line.quantity
                ),
                severity: Severity::Reject,
            });
        }
    }

    // ================================================================
    // RULE 4: Document total must equal the sum of line totals
    // ================================================================
    let line_sum: f64 = document.lines.iter().map(|l| l.line_total).sum();
    if (document.total_price - line_sum).abs() > 0.01 * document.lines.len().max(1) as f64 {
        violations.push(Violation {
            rule: "TOTAL_MATCHES_LINES",
            detail: format!(
                "Document total {:.2} doesn't match line sum {:.2}",
                document.total_price, line_sum
            ),
            severity: Severity::Reject,
        });
    }

    // ================================================================
    // RULE 5: Unit prices must sit within guard bounds
    //         (a post-pricing edit cannot smuggle a price past the guard)
    // ================================================================
    for line in &document.lines {
        let guard = snapshot
            .guards
            .lookup(&line.product_class, &line.unit, document.region.as_deref());
        if let Some(guard) = guard {
            if line.unit_price < guard.floor_price - MONEY_EPSILON
                || line.unit_price > guard.ceiling_price + MONEY_EPSILON
            {
                violations.push(Violation {
                    rule: "LINE_PRICE_WITHIN_GUARD",
                    detail: format!(
                        "Line '{}': unit price {:.2} outside [{:.2}, {:.2}] for {}/{}",
                        line.description,
                        line.unit_price,
                        guard.floor_price,
                        guard.ceiling_price,
                        line.product_class,
                        line.unit
                    ),
                    severity: Severity::Reject,
                });
            }
        } else {
            violations.push(Violation {
                rule: "LINE_WITHOUT_GUARD",
                detail: format!(
                    "No price guard configured for {}/{}; price not re-checked",
                    line.product_class, line.unit
                ),
                severity: Severity::Warn,
            });
        }
    }

    let valid = !violations.iter().any(|v| v.severity == Severity::Reject);
    ValidationResult { valid, violations }
}
