use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::Question;
use crate::spec::rule::{RuleSet, VisibilityRule};

/// The external base and table a form reads its schema from and writes rows to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableRef {
    pub base_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(base_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            table_id: table_id.into(),
        }
    }
}

/// Authoring input for creating or updating a form.
///
/// Rules are a loose list here; several rules may name the same target and
/// the last one wins once the draft is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDraft {
    pub name: String,
    pub table: TableRef,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub rules: Vec<VisibilityRule>,
}

/// A validated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub table: TableRef,
    pub questions: Vec<Question>,
    #[serde(default)]
    #[schemars(with = "Vec<VisibilityRule>")]
    pub rules: RuleSet,
}

impl FormDefinition {
    pub fn question(&self, field_id: &str) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.field_id == field_id)
    }

    /// Position of `field_id` in question order.
    pub fn position(&self, field_id: &str) -> Option<usize> {
        self.questions
            .iter()
            .position(|question| question.field_id == field_id)
    }

    /// Draft that validates back to this definition.
    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            name: self.name.clone(),
            table: self.table.clone(),
            questions: self.questions.clone(),
            rules: self.rules.iter().cloned().collect(),
        }
    }
}
