use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("use case '{use_case}' has duplicate field '{field_name}'")]
    DuplicateFieldName {
        use_case: String,
        field_name: String,
    },

    #[error("use case '{use_case}' select question '{field_name}' has fewer than 2 options")]
    SelectWithoutOptions {
        use_case: String,
        field_name: String,
    },

    #[error("use case '{use_case}' has duplicate display order {display_order}")]
    DuplicateDisplayOrder {
        use_case: String,
        display_order: u32,
    },
}

/// How the wizard renders and validates a question's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Number,
    Select,
    Boolean,
    Text,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Number => write!(f, "number"),
            QuestionType::Select => write!(f, "select"),
            QuestionType::Boolean => write!(f, "boolean"),
            QuestionType::Text => write!(f, "text"),
        }
    }
}

/// One selectable answer for a select question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

/// One wizard question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable machine key, unique within a use case, e.g. "grid_connection".
    pub field_name: String,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub help_text: String,
    pub is_required: bool,
    pub display_order: u32,
}

/// The ordered questionnaire for one industry use case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseTemplate {
    /// Stable key, e.g. "cold_storage", "data_center".
    pub use_case: String,
    #[serde(default)]
    pub display_name: String,
    pub questions: Vec<Question>,
}

/// All use-case templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionCatalog {
    pub use_cases: Vec<UseCaseTemplate>,
}

impl QuestionCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, use_case: &str) -> Option<&UseCaseTemplate> {
        self.use_cases.iter().find(|u| u.use_case == use_case)
    }

    /// Content validation, run after normalization: unique field names,
    /// unique display orders, select questions with real option lists.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for template in &self.use_cases {
            let mut seen_fields = std::collections::HashSet::new();
            let mut seen_orders = std::collections::HashSet::new();
            for q in &template.questions {
                if !seen_fields.insert(q.field_name.as_str()) {
                    return Err(CatalogError::DuplicateFieldName {
                        use_case: template.use_case.clone(),
                        field_name: q.field_name.clone(),
                    });
                }
                if !seen_orders.insert(q.display_order) {
                    return Err(CatalogError::DuplicateDisplayOrder {
                        use_case: template.use_case.clone(),
                        display_order: q.display_order,
                    });
                }
                if q.question_type == QuestionType::Select && q.options.len() < 2 {
                    return Err(CatalogError::SelectWithoutOptions {
                        use_case: template.use_case.clone(),
                        field_name: q.field_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
