use std::collections::BTreeMap;

use thiserror::Error;

use crate::spec::field_type::FieldType;
use crate::spec::form::{FormDefinition, FormDraft};
use crate::spec::question::Question;
use crate::spec::rule::{RuleSet, VisibilityRule};

/// The invariant a rejected draft violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("form name must not be empty")]
    EmptyName,
    #[error("form must reference a base and a table")]
    MissingTable,
    #[error("question at position {position} has an empty field id")]
    EmptyFieldId { position: usize },
    #[error("question '{field_id}' has an empty label")]
    EmptyLabel { field_id: String },
    #[error("field id '{field_id}' is used by more than one question")]
    DuplicateFieldId { field_id: String },
    #[error("{kind} question '{field_id}' needs at least one option")]
    MissingOptions { field_id: String, kind: FieldType },
    #[error("rule targets unknown question '{target}'")]
    UnknownRuleTarget { target: String },
    #[error("rule for '{target}' depends on unknown question '{source_field}'")]
    UnknownRuleSource { target: String, source_field: String },
    #[error("rule for '{target}' has an empty required value")]
    EmptyRequiredValue { target: String },
    #[error("rule for '{target}' depends on '{source_field}', which does not come before it")]
    ForwardReference { target: String, source_field: String },
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "empty_name",
            ValidationError::MissingTable => "missing_table",
            ValidationError::EmptyFieldId { .. } => "empty_field_id",
            ValidationError::EmptyLabel { .. } => "empty_label",
            ValidationError::DuplicateFieldId { .. } => "duplicate_field_id",
            ValidationError::MissingOptions { .. } => "missing_options",
            ValidationError::UnknownRuleTarget { .. } => "unknown_rule_target",
            ValidationError::UnknownRuleSource { .. } => "unknown_rule_source",
            ValidationError::EmptyRequiredValue { .. } => "empty_required_value",
            ValidationError::ForwardReference { .. } => "forward_reference",
        }
    }
}

/// Checks `draft` and produces the normalized definition for `id`/`owner_id`.
///
/// Options are dropped from non-select questions and rules collapse to one per
/// target, keeping the last supplied. Nothing is produced on failure.
pub fn validate_form(
    id: impl Into<String>,
    owner_id: impl Into<String>,
    draft: &FormDraft,
) -> Result<FormDefinition, ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if draft.table.base_id.trim().is_empty() || draft.table.table_id.trim().is_empty() {
        return Err(ValidationError::MissingTable);
    }

    let questions = validate_questions(&draft.questions)?;
    let positions: BTreeMap<&str, usize> = questions
        .iter()
        .enumerate()
        .map(|(position, question)| (question.field_id.as_str(), position))
        .collect();

    let mut rules = RuleSet::new();
    for rule in &draft.rules {
        check_rule(rule, &positions)?;
        if let Some(replaced) = rules.insert(rule.clone()) {
            tracing::debug!(
                target_field = %replaced.target_field_id,
                "replacing earlier visibility rule for the same target"
            );
        }
    }

    for rule in rules.iter() {
        warn_if_unreachable(rule, &questions, &positions);
    }

    Ok(FormDefinition {
        id: id.into(),
        name: draft.name.clone(),
        owner_id: owner_id.into(),
        table: draft.table.clone(),
        questions,
        rules,
    })
}

/// Re-checks a definition that did not come out of [`validate_form`], such as one
/// read back from JSON, keeping its id and owner.
pub fn revalidate(form: &FormDefinition) -> Result<FormDefinition, ValidationError> {
    validate_form(form.id.clone(), form.owner_id.clone(), &form.to_draft())
}

fn validate_questions(questions: &[Question]) -> Result<Vec<Question>, ValidationError> {
    let mut seen = BTreeMap::new();
    let mut normalized = Vec::with_capacity(questions.len());

    for (position, question) in questions.iter().enumerate() {
        if question.field_id.trim().is_empty() {
            return Err(ValidationError::EmptyFieldId { position });
        }
        if question.label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel {
                field_id: question.field_id.clone(),
            });
        }
        if seen.insert(question.field_id.as_str(), position).is_some() {
            return Err(ValidationError::DuplicateFieldId {
                field_id: question.field_id.clone(),
            });
        }

        let mut question = question.clone();
        if question.kind.requires_options() {
            if question.options.is_empty() {
                return Err(ValidationError::MissingOptions {
                    field_id: question.field_id,
                    kind: question.kind,
                });
            }
        } else {
            question.options.clear();
        }
        normalized.push(question);
    }

    Ok(normalized)
}

fn check_rule(
    rule: &VisibilityRule,
    positions: &BTreeMap<&str, usize>,
) -> Result<(), ValidationError> {
    let target = rule.target_field_id.clone();
    let Some(target_position) = positions.get(rule.target_field_id.as_str()) else {
        return Err(ValidationError::UnknownRuleTarget { target });
    };
    let Some(source_position) = positions.get(rule.source_field_id.as_str()) else {
        return Err(ValidationError::UnknownRuleSource {
            target,
            source_field: rule.source_field_id.clone(),
        });
    };
    if rule.required_value.is_empty() {
        return Err(ValidationError::EmptyRequiredValue { target });
    }
    if source_position >= target_position {
        return Err(ValidationError::ForwardReference {
            target,
            source_field: rule.source_field_id.clone(),
        });
    }
    Ok(())
}

fn warn_if_unreachable(
    rule: &VisibilityRule,
    questions: &[Question],
    positions: &BTreeMap<&str, usize>,
) {
    let Some(source) = positions
        .get(rule.source_field_id.as_str())
        .and_then(|position| questions.get(*position))
    else {
        return;
    };

    match source.kind {
        FieldType::MultiSelect => tracing::warn!(
            target_field = %rule.target_field_id,
            source_field = %rule.source_field_id,
            "rule source is a multi-select question and never matches a single value"
        ),
        FieldType::SingleSelect if !source.option_names().any(|name| name == rule.required_value) => {
            tracing::warn!(
                target_field = %rule.target_field_id,
                source_field = %rule.source_field_id,
                required_value = %rule.required_value,
                "required value is not one of the source question's options"
            )
        }
        _ => {}
    }
}
