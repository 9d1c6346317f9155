use serde_json::{Map, Value, json};

use crate::{
    answers::{AnswerSet, AnswerValue},
    spec::{field_type::FieldType, form::FormDefinition},
    visibility::resolve_visibility,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// At least one visible question is unanswered.
    NeedInput,
    /// Every visible question has an answer.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Input widget a question renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    TextArea,
    Select,
    Checkboxes,
    Url,
}

impl InputKind {
    pub fn for_field(kind: FieldType) -> Self {
        match kind {
            FieldType::ShortText => InputKind::Text,
            FieldType::LongText => InputKind::TextArea,
            FieldType::SingleSelect => InputKind::Select,
            FieldType::MultiSelect => InputKind::Checkboxes,
            FieldType::AttachmentUrl => InputKind::Url,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::TextArea => "textarea",
            InputKind::Select => "select",
            InputKind::Checkboxes => "checkboxes",
            InputKind::Url => "url",
        }
    }

    /// Prompt hint shown next to the label in text output.
    pub fn hint(&self) -> &'static str {
        match self {
            InputKind::Text => "single line",
            InputKind::TextArea => "free text",
            InputKind::Select => "pick one",
            InputKind::Checkboxes => "pick any, comma separated",
            InputKind::Url => "public file URL",
        }
    }
}

/// Progress counters over visible questions.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub field_id: String,
    pub label: String,
    pub kind: FieldType,
    pub input: InputKind,
    pub options: Vec<String>,
    pub visible: bool,
    pub current_value: Option<AnswerValue>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_name: String,
    pub status: RenderStatus,
    pub next_field_id: Option<String>,
    pub progress: RenderProgress,
    pub questions: Vec<RenderQuestion>,
}

impl RenderPayload {
    pub fn question(&self, field_id: &str) -> Option<&RenderQuestion> {
        self.questions
            .iter()
            .find(|question| question.field_id == field_id)
    }

    pub fn visible(&self) -> impl Iterator<Item = &RenderQuestion> {
        self.questions.iter().filter(|question| question.visible)
    }
}

/// Build the renderer payload from the form and the answers so far.
pub fn build_render_payload(form: &FormDefinition, answers: &AnswerSet) -> RenderPayload {
    let visibility = resolve_visibility(form, answers);

    let questions = form
        .questions
        .iter()
        .map(|question| RenderQuestion {
            field_id: question.field_id.clone(),
            label: question.label.clone(),
            kind: question.kind,
            input: InputKind::for_field(question.kind),
            options: question.option_names().map(str::to_string).collect(),
            visible: visibility
                .get(&question.field_id)
                .copied()
                .unwrap_or(true),
            current_value: answers.get(&question.field_id).cloned(),
        })
        .collect::<Vec<_>>();

    let total = questions.iter().filter(|question| question.visible).count();
    let answered = questions
        .iter()
        .filter(|question| question.visible && answers.is_answered(&question.field_id))
        .count();
    let next_field_id = questions
        .iter()
        .find(|question| question.visible && !answers.is_answered(&question.field_id))
        .map(|question| question.field_id.clone());

    let status = if next_field_id.is_some() {
        RenderStatus::NeedInput
    } else {
        RenderStatus::Complete
    };

    RenderPayload {
        form_id: form.id.clone(),
        form_name: form.name.clone(),
        status,
        next_field_id,
        progress: RenderProgress { answered, total },
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("field_id".into(), Value::String(question.field_id.clone()));
            map.insert("label".into(), Value::String(question.label.clone()));
            map.insert("type".into(), Value::String(question.kind.as_str().into()));
            map.insert("input".into(), Value::String(question.input.as_str().into()));
            if !question.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(
                        question
                            .options
                            .iter()
                            .map(|option| Value::String(option.clone()))
                            .collect(),
                    ),
                );
            }
            if let Some(current_value) = &question.current_value {
                map.insert("current_value".into(), current_value.to_json());
            }
            map.insert("visible".into(), Value::Bool(question.visible));
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_name": payload.form_name,
        "status": payload.status.as_str(),
        "next_field_id": payload.next_field_id,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_name, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));

    if let Some(next) = payload
        .next_field_id
        .as_deref()
        .and_then(|field_id| payload.question(field_id))
    {
        lines.push(format!("Next question: {} ({})", next.label, next.field_id));
        lines.push(format!("  Input: {}", next.input.hint()));
        if !next.options.is_empty() {
            lines.push(format!("  Options: {}", next.options.join(", ")));
        }
    } else {
        lines.push("All visible questions are answered.".to_string());
    }

    lines.push("Visible questions:".to_string());
    for question in payload.visible() {
        let mut entry = format!(" - {} ({})", question.label, question.field_id);
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(" = {}", value_to_display(current_value)));
        }
        lines.push(entry);
    }

    lines.join("\n")
}

pub fn value_to_display(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Text(text) => text.clone(),
        AnswerValue::Many(items) => items.join(", "),
    }
}
