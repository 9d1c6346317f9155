use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::answers::{AnswerSet, AnswerValue};
use crate::spec::field_type::FieldType;
use crate::spec::form::FormDefinition;

/// Body of an external record-creation call: `{"fields": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub fields: Map<String, Value>,
}

/// Mapped submission plus the field ids it carries, in form order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedSubmission {
    pub payload: RecordPayload,
    pub present: Vec<String>,
}

/// Coerces the answers of every question into the external field shape.
///
/// Unanswered questions are left out rather than sent as null, and answers
/// keyed by anything other than a question's field id are ignored.
pub fn map_submission(form: &FormDefinition, answers: &AnswerSet) -> MappedSubmission {
    let mut mapped = MappedSubmission::default();

    for question in &form.questions {
        let Some(answer) = answers.get(&question.field_id) else {
            continue;
        };
        if let Some(value) = coerce(question.kind, answer) {
            mapped
                .payload
                .fields
                .insert(question.field_id.clone(), value);
            mapped.present.push(question.field_id.clone());
        }
    }

    tracing::debug!(
        form_id = %form.id,
        fields = mapped.present.len(),
        "mapped submission payload"
    );
    mapped
}

fn coerce(kind: FieldType, answer: &AnswerValue) -> Option<Value> {
    match kind {
        FieldType::ShortText
        | FieldType::LongText
        | FieldType::SingleSelect
        | FieldType::MultiSelect => Some(answer.to_json()),
        FieldType::AttachmentUrl => match answer {
            AnswerValue::Text(url) if !url.is_empty() => Some(json!([{ "url": url }])),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Question, RuleSet, TableRef};

    fn form() -> FormDefinition {
        FormDefinition {
            id: "form-1".into(),
            name: "Mapping".into(),
            owner_id: "owner".into(),
            table: TableRef::new("app1", "tbl1"),
            questions: vec![
                Question::new("name", "Name", FieldType::ShortText),
                Question::new("bio", "Bio", FieldType::LongText),
                Question::new("photo", "Photo", FieldType::AttachmentUrl),
                Question::new("colors", "Colors", FieldType::MultiSelect)
                    .with_options(["Red", "Blue"]),
            ],
            rules: RuleSet::new(),
        }
    }

    #[test]
    fn text_values_pass_through_even_when_empty() {
        let answers = AnswerSet::new().with("name", "Ada").with("bio", "");
        let mapped = map_submission(&form(), &answers);
        assert_eq!(mapped.payload.fields["name"], json!("Ada"));
        assert_eq!(mapped.payload.fields["bio"], json!(""));
        assert_eq!(mapped.present, vec!["name", "bio"]);
    }

    #[test]
    fn unknown_answer_keys_are_ignored() {
        let answers = AnswerSet::new().with("name", "Ada").with("fldRogue", "x");
        let mapped = map_submission(&form(), &answers);
        assert!(!mapped.payload.fields.contains_key("fldRogue"));
        assert_eq!(mapped.present, vec!["name"]);
    }

    #[test]
    fn list_answer_for_attachment_is_omitted() {
        let answers = AnswerSet::new().with("photo", vec!["https://x/y.png".to_string()]);
        let mapped = map_submission(&form(), &answers);
        assert!(mapped.payload.fields.is_empty());
        assert!(mapped.present.is_empty());
    }

    #[test]
    fn payload_serializes_with_fields_envelope() {
        let answers = AnswerSet::new().with("name", "Ada");
        let body = serde_json::to_value(map_submission(&form(), &answers).payload)
            .expect("serialize");
        assert_eq!(body, json!({ "fields": { "name": "Ada" } }));
    }
}
