use form_spec::{
    AnswerSet, FormDefinition, InputKind, RenderStatus, answers_schema, build_render_payload,
    render_json_ui, render_text, resolve_visibility,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "role_team_form" => include_str!("../tests/fixtures/role_team_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn form() -> FormDefinition {
    serde_json::from_str(fixture("role_team_form")).expect("deserialize")
}

#[test]
fn render_text_includes_next_question() {
    let payload = build_render_payload(&form(), &AnswerSet::new());

    assert_eq!(payload.status, RenderStatus::NeedInput);
    assert_eq!(payload.next_field_id.as_deref(), Some("fldRole"));

    let text = render_text(&payload);
    assert!(text.contains("Next question: Role"));
    assert!(text.contains("Options: Engineer, Manager"));
    assert!(text.contains("Visible questions"));
    assert!(!text.contains("fldTeam"));
}

#[test]
fn render_json_ui_exposes_structure() {
    let answers = AnswerSet::new().with("fldRole", "Engineer");
    let payload = build_render_payload(&form(), &answers);

    let ui = render_json_ui(&payload);
    assert_eq!(ui["form_id"], "role-team");
    assert_eq!(ui["progress"]["total"], 2);
    assert_eq!(ui["progress"]["answered"], 1);
    assert_eq!(ui["next_field_id"], "fldTeam");
    let questions = ui["questions"].as_array().expect("questions array");
    assert_eq!(questions[0]["input"], "select");
    assert_eq!(questions[0]["current_value"], "Engineer");
    assert_eq!(questions[1]["input"], "text");
    assert_eq!(questions[1]["visible"], true);
}

#[test]
fn hidden_questions_do_not_block_completion() {
    let answers = AnswerSet::new().with("fldRole", "Manager");
    let payload = build_render_payload(&form(), &answers);
    assert_eq!(payload.status, RenderStatus::Complete);
    assert_eq!(payload.progress.total, 1);
    assert_eq!(payload.question("fldTeam").map(|q| q.visible), Some(false));
    assert_eq!(
        payload.question("fldRole").map(|q| q.input),
        Some(InputKind::Select)
    );
}

#[test]
fn answer_schema_tracks_visibility() {
    let form = form();
    let hidden = resolve_visibility(&form, &AnswerSet::new());
    let schema = answers_schema(&form, &hidden);
    let props = schema["properties"].as_object().expect("properties");
    assert!(props.contains_key("fldRole"));
    assert!(!props.contains_key("fldTeam"));
    assert_eq!(
        props["fldRole"]["enum"],
        serde_json::json!(["Engineer", "Manager"])
    );

    let shown = resolve_visibility(&form, &AnswerSet::new().with("fldRole", "Engineer"));
    let schema = answers_schema(&form, &shown);
    assert_eq!(schema["properties"]["fldTeam"]["type"], "string");
    assert_eq!(schema["additionalProperties"], false);
}
