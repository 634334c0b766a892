//! The universal question set.
//!
//! Five questions every use case carries regardless of industry: facility
//! size, operating hours, peak load, grid connection quality, and grid
//! capacity. Grid quality drives backup power needs and battery/solar
//! sizing, so the connection question is required everywhere.

use serde_json::json;

use crate::types::{Question, QuestionOption, QuestionType};

fn option(value: &str, label: &str) -> QuestionOption {
    QuestionOption {
        value: value.into(),
        label: label.into(),
    }
}

/// Build the universal questions with display orders following `base`.
pub fn universal_questions(base: u32) -> Vec<Question> {
    vec![
        Question {
            field_name: "facility_size".into(),
            question_text: "Facility size (sq ft)".into(),
            question_type: QuestionType::Number,
            options: vec![],
            unit: Some("sq ft".into()),
            default_value: Some(json!(10_000)),
            help_text: "Total building/facility square footage".into(),
            is_required: false,
            display_order: base + 1,
        },
        Question {
            field_name: "operating_hours".into(),
            question_text: "Daily operating hours".into(),
            question_type: QuestionType::Number,
            options: vec![],
            unit: Some("hours".into()),
            default_value: Some(json!(12)),
            help_text: "Hours per day the facility operates".into(),
            is_required: true,
            display_order: base + 2,
        },
        Question {
            field_name: "peak_load".into(),
            question_text: "Peak power demand (if known)".into(),
            question_type: QuestionType::Number,
            options: vec![],
            unit: Some("MW".into()),
            default_value: Some(json!(0)),
            help_text: "Optional: actual peak load from the utility bill (leave 0 for auto-calculation)"
                .into(),
            is_required: false,
            display_order: base + 3,
        },
        Question {
            field_name: "grid_connection".into(),
            question_text: "Grid connection quality".into(),
            question_type: QuestionType::Select,
            options: vec![
                option("reliable", "Reliable Grid - Stable power, rare outages"),
                option("unreliable", "Unreliable Grid - Frequent outages, needs backup"),
                option("limited", "Limited Capacity - Grid undersized, may need microgrid"),
                option("off_grid", "Off-Grid - No utility connection, full microgrid needed"),
                option("microgrid", "Microgrid - Independent power system with optional grid tie"),
            ],
            unit: None,
            default_value: Some(json!("reliable")),
            help_text: "Grid quality determines backup power needs and battery/solar sizing".into(),
            is_required: true,
            display_order: base + 4,
        },
        Question {
            field_name: "grid_capacity".into(),
            question_text: "Grid connection capacity (if limited)".into(),
            question_type: QuestionType::Number,
            options: vec![],
            unit: Some("MW".into()),
            default_value: Some(json!(0)),
            help_text: "If limited grid: enter max capacity from the utility. If 0, we assume unlimited grid."
                .into(),
            is_required: false,
            display_order: base + 5,
        },
    ]
}
