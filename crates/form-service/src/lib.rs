pub mod config;
pub mod credentials;
pub mod http;
pub mod remote;
pub mod service;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use form_spec::{
    AnswerSet, FormDefinition, FormDraft, RenderPayload, answers_schema, build_render_payload,
    render_json_ui as spec_render_json_ui, render_text as spec_render_text, resolve_visibility,
    retain_visible, revalidate, validate_form, visible_questions as spec_visible_questions,
};

pub use config::{DEFAULT_API_BASE_URL, HiddenAnswerPolicy, ServiceConfig};
pub use credentials::{Credential, CredentialProvider, InMemoryCredentials};
pub use http::AirtableClient;
pub use remote::{RecordRequest, RecordWriter, RemoteError, SchemaSource, StaticSchema};
pub use service::{
    FormService, ServiceError, SubmissionReceipt, list_supported_fields, table_names,
};
pub use store::{FormStore, InMemoryFormStore, StoreError};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse answers: {0}")]
    AnswersParse(#[source] serde_json::Error),
    #[error("failed to parse form draft: {0}")]
    DraftParse(#[source] serde_json::Error),
    #[error("no form definition configured")]
    MissingForm,
    #[error("form '{0}' is not available")]
    FormUnavailable(String),
    #[error("invalid form: {0}")]
    Invalid(#[from] form_spec::ValidationError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

/// Config accepted by the string-in/string-out entry points.
#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_definition_json: Option<String>,
    #[serde(default)]
    service: ServiceConfig,
}

fn parse_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn load_form(config: &ComponentConfig) -> Result<FormDefinition, ComponentError> {
    let form_json = config
        .form_definition_json
        .as_deref()
        .ok_or(ComponentError::MissingForm)?;
    let form: FormDefinition =
        serde_json::from_str(form_json).map_err(ComponentError::ConfigParse)?;
    Ok(revalidate(&form)?)
}

fn ensure_form(form_id: &str, config_json: &str) -> Result<(FormDefinition, ServiceConfig), ComponentError> {
    let config = parse_config(config_json)?;
    let form = load_form(&config)?;
    if form.id != form_id {
        Err(ComponentError::FormUnavailable(form_id.to_string()))
    } else {
        Ok((form, config.service))
    }
}

fn parse_answers(answers_json: &str) -> Result<AnswerSet, ComponentError> {
    if answers_json.trim().is_empty() {
        Ok(AnswerSet::new())
    } else {
        serde_json::from_str(answers_json).map_err(ComponentError::AnswersParse)
    }
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(ComponentError::Invalid(err)) => {
            json!({ "error": err.to_string(), "code": err.code() }).to_string()
        }
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => respond(Err(err)),
    }
}

pub fn describe(form_id: &str, config_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|(form, _)| {
        serde_json::to_value(form).map_err(ComponentError::JsonEncode)
    }))
}

/// Validates a draft and returns the normalized definition.
pub fn validate_form_json(form_id: &str, owner_id: &str, draft_json: &str) -> String {
    respond(
        serde_json::from_str::<FormDraft>(draft_json)
            .map_err(ComponentError::DraftParse)
            .and_then(|draft| Ok(validate_form(form_id, owner_id, &draft)?))
            .and_then(|form| serde_json::to_value(form).map_err(ComponentError::JsonEncode)),
    )
}

pub fn visible_questions(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|(form, _)| {
        let answers = parse_answers(answers_json)?;
        let visible: Vec<&str> = spec_visible_questions(&form, &answers)
            .into_iter()
            .map(|question| question.field_id.as_str())
            .collect();
        Ok(json!({
            "visible": visible,
            "visibility": resolve_visibility(&form, &answers),
        }))
    }))
}

pub fn get_answer_schema(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|(form, _)| {
        let answers = parse_answers(answers_json)?;
        let visibility = resolve_visibility(&form, &answers);
        Ok(answers_schema(&form, &visibility))
    }))
}

fn render_payload(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
) -> Result<RenderPayload, ComponentError> {
    let (form, _) = ensure_form(form_id, config_json)?;
    let answers = parse_answers(answers_json)?;
    Ok(build_render_payload(&form, &answers))
}

pub fn render_text(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond_string(
        render_payload(form_id, config_json, answers_json).map(|payload| spec_render_text(&payload)),
    )
}

pub fn render_json_ui(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(
        render_payload(form_id, config_json, answers_json)
            .map(|payload| spec_render_json_ui(&payload)),
    )
}

/// Record-creation body for the answers, after the configured hidden-answer policy.
pub fn map_submission(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|(form, service)| {
        let answers = parse_answers(answers_json)?;
        let answers = match service.hidden_answers {
            HiddenAnswerPolicy::Clear => retain_visible(&form, &answers),
            HiddenAnswerPolicy::Retain => answers,
        };
        let mapped = form_spec::map_submission(&form, &answers);
        serde_json::to_value(mapped.payload).map_err(ComponentError::JsonEncode)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form_json() -> Value {
        json!({
            "id": "role-team",
            "name": "Team signup",
            "owner_id": "usrOwner",
            "table": { "base_id": "appHR", "table_id": "tblPeople" },
            "questions": [
                {
                    "field_id": "fldRole",
                    "label": "Role",
                    "type": "single_select",
                    "options": [
                        { "id": "selEng", "name": "Engineer" },
                        { "id": "selMgr", "name": "Manager" }
                    ]
                },
                { "field_id": "fldTeam", "label": "Team", "type": "short_text" },
                { "field_id": "fldBadge", "label": "Badge photo", "type": "attachment_url" }
            ],
            "rules": [
                { "target_field_id": "fldTeam", "source_field_id": "fldRole", "required_value": "Engineer" }
            ]
        })
    }

    fn config() -> String {
        json!({ "form_definition_json": form_json().to_string() }).to_string()
    }

    #[test]
    fn describe_returns_definition_json() {
        let payload = describe("role-team", &config());
        let form: Value = serde_json::from_str(&payload).expect("valid json");
        assert_eq!(form["id"], "role-team");
        assert_eq!(form["rules"][0]["target_field_id"], "fldTeam");
    }

    #[test]
    fn describe_rejects_other_form_ids() {
        let payload = describe("other", &config());
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["error"], "form 'other' is not available");
    }

    #[test]
    fn missing_definition_is_reported() {
        let payload = describe("role-team", "");
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["error"], "no form definition configured");
    }

    #[test]
    fn visible_questions_follow_rules() {
        let response = visible_questions("role-team", &config(), r#"{"fldRole":"Engineer"}"#);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(parsed["visible"], json!(["fldRole", "fldTeam", "fldBadge"]));

        let response = visible_questions("role-team", &config(), "{}");
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(parsed["visible"], json!(["fldRole", "fldBadge"]));
        assert_eq!(parsed["visibility"]["fldTeam"], false);
    }

    #[test]
    fn malformed_answers_are_reported() {
        let response = visible_questions("role-team", &config(), r#"{"fldRole": 3}"#);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert!(
            parsed["error"]
                .as_str()
                .unwrap_or_default()
                .starts_with("failed to parse answers")
        );
    }

    fn config_for(form: Value) -> String {
        json!({ "form_definition_json": form.to_string() }).to_string()
    }

    fn error_code(response: &str) -> Value {
        let parsed: Value = serde_json::from_str(response).expect("json");
        assert!(parsed["error"].is_string(), "expected an error, got {parsed}");
        parsed["code"].clone()
    }

    #[test]
    fn configured_forward_rule_is_rejected() {
        let mut form = form_json();
        form["questions"] = json!([
            { "field_id": "a", "label": "A", "type": "short_text" },
            { "field_id": "b", "label": "B", "type": "short_text" }
        ]);
        form["rules"] = json!([
            { "target_field_id": "a", "source_field_id": "b", "required_value": "go" }
        ]);
        let config = config_for(form);
        let answers = r#"{"a":"hello","b":"go"}"#;

        assert_eq!(error_code(&map_submission("role-team", &config, answers)), "forward_reference");
        assert_eq!(error_code(&visible_questions("role-team", &config, answers)), "forward_reference");
        assert_eq!(error_code(&describe("role-team", &config)), "forward_reference");
        assert_eq!(error_code(&render_text("role-team", &config, answers)), "forward_reference");
    }

    #[test]
    fn configured_malformed_forms_are_rejected() {
        let mut duplicate = form_json();
        duplicate["questions"][1]["field_id"] = json!("fldRole");
        duplicate["rules"] = json!([]);
        assert_eq!(
            error_code(&describe("role-team", &config_for(duplicate))),
            "duplicate_field_id"
        );

        let mut no_options = form_json();
        no_options["questions"][0]["options"] = json!([]);
        no_options["rules"] = json!([]);
        assert_eq!(
            error_code(&map_submission("role-team", &config_for(no_options), "{}")),
            "missing_options"
        );

        let mut unnamed = form_json();
        unnamed["name"] = json!("");
        assert_eq!(error_code(&describe("role-team", &config_for(unnamed))), "empty_name");

        let mut no_table = form_json();
        no_table["table"] = json!({ "base_id": "", "table_id": "" });
        assert_eq!(error_code(&describe("role-team", &config_for(no_table))), "missing_table");
    }

    #[test]
    fn validate_form_json_reports_code() {
        let draft = json!({
            "name": "Broken",
            "table": { "base_id": "appHR", "table_id": "tblPeople" },
            "questions": [
                { "field_id": "fldA", "label": "A", "type": "short_text" },
                { "field_id": "fldA", "label": "A again", "type": "short_text" }
            ]
        });
        let response = validate_form_json("f1", "usrOwner", &draft.to_string());
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(parsed["code"], "duplicate_field_id");
    }

    #[test]
    fn validate_form_json_returns_normalized_form() {
        let draft = json!({
            "name": "Ok",
            "table": { "base_id": "appHR", "table_id": "tblPeople" },
            "questions": [
                { "field_id": "fldA", "label": "A", "type": "short_text",
                  "options": [{ "id": "x", "name": "x" }] }
            ]
        });
        let response = validate_form_json("f1", "usrOwner", &draft.to_string());
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(parsed["id"], "f1");
        assert!(parsed["questions"][0].get("options").is_none());
    }

    #[test]
    fn map_submission_clears_hidden_answers_by_default() {
        let answers = r#"{"fldRole":"Manager","fldTeam":"Stale","fldBadge":"https://x/y.png"}"#;
        let response = map_submission("role-team", &config(), answers);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(
            parsed,
            json!({
                "fields": {
                    "fldRole": "Manager",
                    "fldBadge": [{ "url": "https://x/y.png" }]
                }
            })
        );
    }

    #[test]
    fn map_submission_can_retain_hidden_answers() {
        let config = json!({
            "form_definition_json": form_json().to_string(),
            "service": { "hidden_answers": "retain" }
        })
        .to_string();
        let answers = r#"{"fldRole":"Manager","fldTeam":"Stale","fldBadge":""}"#;
        let response = map_submission("role-team", &config, answers);
        let parsed: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(
            parsed,
            json!({ "fields": { "fldRole": "Manager", "fldTeam": "Stale" } })
        );
    }

    #[test]
    fn render_text_outputs_summary() {
        let output = render_text("role-team", &config(), "{}");
        assert!(output.contains("Form: Team signup"));
        assert!(output.contains("Visible questions"));
    }

    #[test]
    fn render_json_ui_outputs_progress() {
        let payload = render_json_ui("role-team", &config(), r#"{"fldRole":"Engineer"}"#);
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["form_id"], "role-team");
        assert_eq!(parsed["progress"]["total"], 3);
        assert_eq!(parsed["progress"]["answered"], 1);
    }

    #[test]
    fn answer_schema_lists_visible_questions() {
        let schema = get_answer_schema("role-team", &config(), "{}");
        let value: Value = serde_json::from_str(&schema).expect("json");
        let props = value["properties"].as_object().expect("properties");
        assert!(props.contains_key("fldRole"));
        assert!(!props.contains_key("fldTeam"));
    }
}
