use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use merlin_pipeline::pipelines::quote_pricing::QuotePricingPipeline;
use merlin_pipeline::policy_loader::load_policy_dir;
use merlin_pipeline::pricing_pipeline::{PipelineResult, QuotePipeline};
use merlin_pipeline::types::{PricedLine, QuoteRequest};
use merlin_policy::audit::AuditLog;

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct QuoteJson {
    generated_at: String,
    request_id: String,
    policy_version: String,
    band_id: String,
    risk_level: String,
    customer_segment: String,
    pipeline_ms: u128,
    lines: Vec<LineJson>,
    excluded_lines: Vec<ExcludedJson>,
    summary: SummaryJson,
    audit_entry_id: Option<String>,
}

#[derive(Serialize)]
struct LineJson {
    line_index: usize,
    product_class: String,
    unit: String,
    description: String,
    quantity: f64,
    base_cost: f64,
    margin: f64,
    unit_sell_price: f64,
    sell_price: f64,
    clamped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    clamp_bound: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ExcludedJson {
    line_index: usize,
    product_class: String,
    reason: String,
}

#[derive(Serialize)]
struct SummaryJson {
    total_base_cost: f64,
    total_sell_price: f64,
    blended_margin_percent: f64,
    line_count: usize,
    excluded_count: usize,
    clamp_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

fn build_json(
    result: &PipelineResult<QuoteRequest, PricedLine>,
    audit: &AuditLog,
    pipeline_ms: u128,
) -> QuoteJson {
    let query = &result.query;
    let lines = &result.selected_candidates;

    let priced_base: f64 = lines.iter().map(|l| l.base_cost).sum();
    let total_sell: f64 = lines.iter().filter_map(|l| l.sell_price).sum();
    let blended = if total_sell > 0.0 {
        (total_sell - priced_base) / total_sell
    } else {
        0.0
    };

    let mut warnings: Vec<String> = lines.iter().flat_map(|l| l.warnings.clone()).collect();
    warnings.sort();
    warnings.dedup();

    QuoteJson {
        generated_at: Utc::now().to_rfc3339(),
        request_id: query.request_id.clone(),
        policy_version: query.policy_version.clone().unwrap_or_default(),
        band_id: query
            .resolved_band
            .as_ref()
            .map(|b| b.id.clone())
            .unwrap_or_default(),
        risk_level: query.risk_level.clone().unwrap_or_default(),
        customer_segment: query.customer_segment.clone().unwrap_or_default(),
        pipeline_ms,
        lines: lines
            .iter()
            .map(|l| LineJson {
                line_index: l.line_index,
                product_class: l.product_class.clone(),
                unit: l.unit.clone(),
                description: l.description.clone(),
                quantity: l.quantity,
                base_cost: l.base_cost,
                margin: l.current_margin().unwrap_or(0.0),
                unit_sell_price: l.unit_sell_price.unwrap_or(0.0),
                sell_price: l.sell_price.unwrap_or(0.0),
                clamped: l.clamp_event.is_some(),
                clamp_bound: l.clamp_event.as_ref().map(|e| e.bound.to_string()),
                warnings: l.warnings.clone(),
            })
            .collect(),
        excluded_lines: result
            .filtered_candidates
            .iter()
            .map(|l| ExcludedJson {
                line_index: l.line_index,
                product_class: l.product_class.clone(),
                reason: "zero quantity or base cost".into(),
            })
            .collect(),
        summary: SummaryJson {
            total_base_cost: query.total_base_cost,
            total_sell_price: total_sell,
            blended_margin_percent: blended * 100.0,
            line_count: lines.len(),
            excluded_count: result.filtered_candidates.len(),
            clamp_count: lines.iter().filter(|l| l.clamp_event.is_some()).count(),
            warnings,
        },
        audit_entry_id: audit
            .find_by_request(&query.request_id)
            .map(|e| e.entry_id),
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a number with comma thousands separators.
fn format_dollars(amount: f64) -> String {
    let whole = amount.abs() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };

    if whole < 1_000 {
        return format!("{}{}", sign, whole);
    }

    let s = whole.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

fn print_human(
    result: &PipelineResult<QuoteRequest, PricedLine>,
    audit: &AuditLog,
    load_ms: u128,
    pipeline_ms: u128,
) {
    let query = &result.query;
    let lines = &result.selected_candidates;

    println!();
    println!("  \u{2554}{}\u{2557}", "\u{2550}".repeat(62));
    println!("  \u{2551}{:^62}\u{2551}", "MERLIN \u{2014} Quote Pricing Sheet");
    println!("  \u{255a}{}\u{255d}", "\u{2550}".repeat(62));
    println!();

    println!(
        "  Request {}  \u{00b7}  policy {}  \u{00b7}  band {}",
        query.request_id,
        query.policy_version.as_deref().unwrap_or("-"),
        query
            .resolved_band
            .as_ref()
            .map(|b| b.id.as_str())
            .unwrap_or("-"),
    );
    println!(
        "  Risk {}  \u{00b7}  segment {}  \u{00b7}  total base cost ${}",
        query.risk_level.as_deref().unwrap_or("-"),
        query.customer_segment.as_deref().unwrap_or("-"),
        format_dollars(query.total_base_cost),
    );
    println!();

    if lines.is_empty() {
        println!("  No priceable lines.");
    } else {
        println!("  {:\u{2500}<64}", "");
        for l in lines {
            let clamp_marker = match &l.clamp_event {
                Some(e) => format!("  [clamped to {}]", e.bound),
                None => String::new(),
            };
            println!(
                "  {}. {:20} {:>10.2} {:6} @ {:>10.2}  = ${}{}",
                l.line_index + 1,
                l.product_class,
                l.quantity,
                l.unit,
                l.unit_sell_price.unwrap_or(0.0),
                format_dollars(l.sell_price.unwrap_or(0.0)),
                clamp_marker,
            );
            println!(
                "       base ${}  \u{00b7}  margin {:.2}%",
                format_dollars(l.base_cost),
                l.current_margin().unwrap_or(0.0) * 100.0,
            );
            for w in &l.warnings {
                println!("       note: {w}");
            }
        }
        println!("  {:\u{2500}<64}", "");
    }

    let priced_base: f64 = lines.iter().map(|l| l.base_cost).sum();
    let total_sell: f64 = lines.iter().filter_map(|l| l.sell_price).sum();
    let blended = if total_sell > 0.0 {
        (total_sell - priced_base) / total_sell
    } else {
        0.0
    };

    println!();
    println!(
        "  Sell total ${}  \u{00b7}  blended margin {:.2}%  \u{00b7}  {} clamp event(s)",
        format_dollars(total_sell),
        blended * 100.0,
        lines.iter().filter(|l| l.clamp_event.is_some()).count(),
    );
    if !result.filtered_candidates.is_empty() {
        println!(
            "  {} line(s) excluded (zero quantity or base cost)",
            result.filtered_candidates.len()
        );
    }
    if let Some(entry) = audit.find_by_request(&query.request_id) {
        println!("  Audit entry {}", entry.entry_id);
    }
    println!();
    println!(
        "  \u{23f1}  Policy loaded in {}ms \u{00b7} Pipeline ran in {}ms \u{00b7} Total {}ms",
        load_ms,
        pipeline_ms,
        load_ms + pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: merlin-server <policy_dir> <quote.json> [--json] [--risk R] [--segment S] [--region R]");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --json      Output as JSON instead of formatted text");
        eprintln!("  --risk      Override the request's risk level");
        eprintln!("  --segment   Override the request's customer segment");
        eprintln!("  --region    Override the request's pricing region");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  merlin-server fixtures/policy fixtures/quote.json");
        eprintln!("  merlin-server fixtures/policy fixtures/quote.json --segment epc_partner --json");
        process::exit(1);
    }

    let policy_dir = &args[1];
    let quote_path = &args[2];

    // Parse optional flags
    let mut json_output = false;
    let mut risk_override: Option<String> = None;
    let mut segment_override: Option<String> = None;
    let mut region_override: Option<String> = None;
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                json_output = true;
                i += 1;
            }
            "--risk" | "--segment" | "--region" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a value", args[i]);
                    process::exit(1);
                }
                let value = args[i + 1].clone();
                match args[i].as_str() {
                    "--risk" => risk_override = Some(value),
                    "--segment" => segment_override = Some(value),
                    _ => region_override = Some(value),
                }
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
    }

    // Load and validate the policy snapshot
    let load_start = Instant::now();
    let snapshot = match load_policy_dir(Path::new(policy_dir)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading policy from '{}': {}", policy_dir, e);
            process::exit(1);
        }
    };
    let load_ms = load_start.elapsed().as_millis();

    // Load the quote request
    let raw = match std::fs::read_to_string(quote_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading '{}': {}", quote_path, e);
            process::exit(1);
        }
    };
    let mut request: QuoteRequest = match serde_json::from_str(&raw) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error parsing quote request: {}", e);
            process::exit(1);
        }
    };
    if risk_override.is_some() {
        request.risk_level = risk_override;
    }
    if segment_override.is_some() {
        request.customer_segment = segment_override;
    }
    if region_override.is_some() {
        request.region = region_override;
    }

    // Build and run the pipeline
    let audit = Arc::new(AuditLog::new());
    let pipeline = QuotePricingPipeline::new(Arc::new(snapshot), Arc::clone(&audit));

    let pipeline_start = Instant::now();
    let result = match pipeline.execute(request).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Pricing failed: {}", e);
            if e.is_configuration() {
                eprintln!("  (policy configuration error \u{2014} contact the policy administrator)");
            }
            process::exit(2);
        }
    };
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    if json_output {
        let quote = build_json(&result, &audit, pipeline_ms);
        match serde_json::to_string_pretty(&quote) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_human(&result, &audit, load_ms, pipeline_ms);
    }
}
