use serde_json::{Map, Value, json};

use crate::spec::{field_type::FieldType, form::FormDefinition, question::Question};
use crate::visibility::VisibilityMap;

/// JSON Schema describing the answers accepted for the visible questions.
pub fn generate(form: &FormDefinition, visibility: &VisibilityMap) -> Value {
    let properties = form
        .questions
        .iter()
        .filter(|question| visibility.get(&question.field_id).copied().unwrap_or(true))
        .map(|question| (question.field_id.clone(), question_schema(question)))
        .collect::<Map<String, Value>>();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": form.name,
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    })
}

fn question_schema(question: &Question) -> Value {
    let options: Vec<&str> = question.option_names().collect();
    let mut schema = match question.kind {
        FieldType::ShortText | FieldType::LongText => json!({ "type": "string" }),
        FieldType::SingleSelect => json!({ "type": "string", "enum": options }),
        FieldType::MultiSelect => json!({
            "type": "array",
            "items": { "type": "string", "enum": options },
            "uniqueItems": true,
        }),
        FieldType::AttachmentUrl => json!({ "type": "string", "format": "uri" }),
    };
    if let Value::Object(map) = &mut schema {
        map.insert("title".into(), Value::String(question.label.clone()));
    }
    schema
}
