use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field_type::FieldType;

/// One selectable choice of a select question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

/// Form-facing wrapper around one field of the external table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    /// External field identifier; unique within a form.
    pub field_id: String,
    /// Display label, independent of the external field name.
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl Question {
    pub fn new(field_id: impl Into<String>, label: impl Into<String>, kind: FieldType) -> Self {
        Self {
            field_id: field_id.into(),
            label: label.into(),
            kind,
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| SelectOption {
                id: format!("opt{}", index + 1),
                name: name.into(),
            })
            .collect();
        self
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.name.as_str())
    }
}
