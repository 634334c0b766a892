use serde::{Deserialize, Serialize};

use merlin_policy::adjust::MarginBreakdown;
use merlin_policy::bands::MarginBand;
use merlin_policy::guards::ClampEvent;

use crate::pricing_pipeline::HasRequestId;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// One line item as submitted by the quote-generation system.
///
/// `base_cost` may be omitted when `quantity` is present; the pipeline
/// derives it from the size-tiered unit pricing tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub product_class: String,
    /// Pricing unit, e.g. "kwh", "kw", "each".
    pub unit: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub base_cost: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// A quote request from the quote-generation system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub request_id: String,
    /// Total base cost of the deal; selects the margin band.
    pub total_base_cost: f64,
    pub line_items: Vec<QuoteLineItem>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub customer_segment: Option<String>,
    #[serde(default)]
    pub policy_version: Option<String>,
    #[serde(default)]
    pub region: Option<String>,

    /// Resolved during query hydration; never read from the wire.
    #[serde(skip)]
    pub resolved_band: Option<MarginBand>,
}

impl HasRequestId for QuoteRequest {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

// ---------------------------------------------------------------------------
// Candidate types
// ---------------------------------------------------------------------------

/// One line item being priced. Stages populate the `Option` fields in
/// order: the source stamps band context, the three margin scorers fill
/// the layered margins, and the price guard hydrator fills sell prices
/// and any clamp event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Position in the original request, preserved for deterministic output.
    pub line_index: usize,
    pub product_class: String,
    pub unit: String,
    pub quantity: f64,
    pub base_cost: f64,
    pub description: String,

    // Band context (populated by the source from the resolved query)
    pub band_id: Option<String>,
    pub band_target: Option<f64>,

    // Margin layers (populated by the scorers, in order)
    pub margin_after_product: Option<f64>,
    pub margin_after_risk: Option<f64>,
    pub margin_after_segment: Option<f64>,

    // Prices (populated by the price guard hydrator)
    pub unit_sell_price: Option<f64>,
    pub sell_price: Option<f64>,
    pub clamp_event: Option<ClampEvent>,

    /// Non-fatal notes accumulated along the way (missing product policy,
    /// missing guard, derived base cost).
    pub warnings: Vec<String>,
}

impl PricedLine {
    /// The margin as of the latest completed layer.
    pub fn current_margin(&self) -> Option<f64> {
        self.margin_after_segment
            .or(self.margin_after_risk)
            .or(self.margin_after_product)
            .or(self.band_target)
    }

    /// Full per-layer trace, available once all three scorers have run.
    pub fn margin_trace(&self) -> Option<MarginBreakdown> {
        Some(MarginBreakdown {
            band_target: self.band_target?,
            after_product: self.margin_after_product?,
            after_risk: self.margin_after_risk?,
            after_segment: self.margin_after_segment?,
        })
    }
}

impl Default for PricedLine {
    fn default() -> Self {
        Self {
            line_index: 0,
            product_class: String::new(),
            unit: String::new(),
            quantity: 0.0,
            base_cost: 0.0,
            description: String::new(),
            band_id: None,
            band_target: None,
            margin_after_product: None,
            margin_after_risk: None,
            margin_after_segment: None,
            unit_sell_price: None,
            sell_price: None,
            clamp_event: None,
            warnings: Vec::new(),
        }
    }
}
