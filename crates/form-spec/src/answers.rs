use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single answer: one string for text, select, and attachment questions,
/// a list of option names for multi-select questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Many(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::Many(items) => items.is_empty(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::Text(text) => Value::String(text.clone()),
            AnswerValue::Many(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        AnswerValue::Text(text.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> Self {
        AnswerValue::Text(text)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(items: Vec<String>) -> Self {
        AnswerValue::Many(items)
    }
}

/// Answers keyed by field id. Built up while a respondent fills the form and
/// only handed to the submission path once complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field_id: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(field_id, value);
        self
    }

    pub fn insert(
        &mut self,
        field_id: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        self.answers.insert(field_id.into(), value.into())
    }

    pub fn get(&self, field_id: &str) -> Option<&AnswerValue> {
        self.answers.get(field_id)
    }

    pub fn remove(&mut self, field_id: &str) -> Option<AnswerValue> {
        self.answers.remove(field_id)
    }

    /// True when `field_id` holds a non-empty answer.
    pub fn is_answered(&self, field_id: &str) -> bool {
        self.get(field_id).is_some_and(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.answers
            .iter()
            .map(|(field_id, value)| (field_id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl<K: Into<String>, V: Into<AnswerValue>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = AnswerSet::new();
        for (field_id, value) in iter {
            set.insert(field_id, value);
        }
        set
    }
}
