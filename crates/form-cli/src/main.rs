mod fill;

use clap::{Parser, Subcommand, ValueEnum};
use fill::{AnswerParseError, FillPresenter, Verbosity};
use form_service::{
    AirtableClient, Credential, FormService, FormStore, InMemoryCredentials, InMemoryFormStore,
    ServiceConfig, list_supported_fields, map_submission, render_json_ui, render_text,
    validate_form_json,
};
use form_spec::{
    AnswerSet, AnswerValue, FieldType, FormDefinition, FormDraft, InputKind, RenderQuestion,
    TableRef, TablesResponse, build_render_payload, find_table, revalidate, supported_fields,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const CONFIG_ENV: &str = "FORMBRIDGE_CONFIG";
const TOKEN_ENV: &str = "FORMBRIDGE_TOKEN";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Table-backed form authoring CLI",
    long_about = "Derives questions from table schemas, validates form drafts, previews visibility, and maps answers to record payloads"
)]
struct Cli {
    /// Emit debug logs on stderr.
    #[arg(long, global = true)]
    verbose: bool,
    /// Service config JSON (defaults to FORMBRIDGE_CONFIG, then built-in defaults).
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported fields of a table, from a saved tables metadata
    /// response or from the API using FORMBRIDGE_TOKEN.
    Fields {
        /// JSON file holding the tables metadata response of a base.
        #[arg(long, value_name = "TABLES")]
        tables: Option<PathBuf>,
        /// Table id to inspect.
        #[arg(long)]
        table: String,
        /// Base id; required without --tables. With --name, print a form draft
        /// instead of the field list.
        #[arg(long)]
        base: Option<String>,
        /// Form name for the generated draft.
        #[arg(long)]
        name: Option<String>,
    },
    /// Validate a form draft and print the normalized definition.
    Validate {
        /// Path to the form draft JSON.
        #[arg(long, value_name = "DRAFT")]
        draft: PathBuf,
        /// Id given to the validated form.
        #[arg(long, default_value = "draft")]
        id: String,
        /// Owner recorded on the validated form.
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Show which questions are visible for a set of answers.
    Visible {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing answers so far.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the record payload a set of answers submits.
    Map {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Fill a form interactively and print the resulting record payload.
    Fill {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing initial answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
    },
    /// Write the answers as a new record of the form's table using FORMBRIDGE_TOKEN.
    Submit {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON file.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print the JSON Schema of a form definition.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Fields {
            tables,
            table,
            base,
            name,
        } => run_fields(tables, &table, base, name, &config),
        Command::Validate { draft, id, owner } => run_validate(draft, &id, &owner),
        Command::Visible {
            form,
            answers,
            format,
        } => run_visible(form, answers, format, &config),
        Command::Map { form, answers } => run_map(form, answers, &config),
        Command::Fill { form, answers } => run_fill(form, answers, cli.verbose, &config),
        Command::Submit { form, answers } => run_submit(form, answers, &config),
        Command::Schema => {
            let schema = schemars::schema_for!(FormDefinition);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> CliResult<ServiceConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => env::var_os(CONFIG_ENV).map(PathBuf::from),
    };
    match path {
        Some(path) => {
            let contents = fs::read_to_string(&path)?;
            tracing::debug!(path = %path.display(), "loaded service config");
            Ok(ServiceConfig::from_json(&contents)?)
        }
        None => Ok(ServiceConfig::default()),
    }
}

fn credential_from_env() -> CliResult<Credential> {
    let token = env::var(TOKEN_ENV).map_err(|_| format!("{TOKEN_ENV} must hold an API token"))?;
    Ok(Credential::new(token))
}

fn run_fields(
    tables_path: Option<PathBuf>,
    table_id: &str,
    base: Option<String>,
    name: Option<String>,
    config: &ServiceConfig,
) -> CliResult<()> {
    let fields = match (tables_path, base.as_deref()) {
        (Some(path), _) => {
            let tables: TablesResponse = serde_json::from_str(&fs::read_to_string(path)?)?;
            supported_fields(find_table(&tables, table_id)?)
        }
        (None, Some(base_id)) => {
            let client = AirtableClient::from_config(config);
            list_supported_fields(&client, &credential_from_env()?, base_id, table_id)?
        }
        (None, None) => return Err("either --tables or --base is required".into()),
    };

    match (base, name) {
        (Some(base_id), Some(name)) => {
            let draft = FormDraft {
                name,
                table: TableRef::new(base_id, table_id),
                questions: fields.iter().map(|field| field.to_question()).collect(),
                rules: Vec::new(),
            };
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        (_, None) => {
            println!("{}", serde_json::to_string_pretty(&json!({ "fields": fields }))?);
        }
        (None, Some(_)) => return Err("--name needs --base".into()),
    }
    Ok(())
}

fn run_validate(draft_path: PathBuf, id: &str, owner: &str) -> CliResult<()> {
    let draft_json = fs::read_to_string(draft_path)?;
    let response = parse_component_result(&validate_form_json(id, owner, &draft_json))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_visible(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    format: RenderMode,
    config: &ServiceConfig,
) -> CliResult<()> {
    let form = load_form(&form_path)?;
    let config_json = component_config(&form, config)?;
    let answers_json = read_answers(answers_path)?;
    match format {
        RenderMode::Text => {
            let text = render_text(&form.id, &config_json, &answers_json);
            if text.starts_with('{') {
                parse_component_result(&text)?;
            }
            println!("{}", text);
        }
        RenderMode::Json => {
            let ui = parse_component_result(&render_json_ui(&form.id, &config_json, &answers_json))?;
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
    }
    Ok(())
}

fn run_map(form_path: PathBuf, answers_path: PathBuf, config: &ServiceConfig) -> CliResult<()> {
    let form = load_form(&form_path)?;
    let config_json = component_config(&form, config)?;
    let answers_json = fs::read_to_string(answers_path)?;
    let payload = parse_component_result(&map_submission(&form.id, &config_json, &answers_json))?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_fill(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    verbose: bool,
    config: &ServiceConfig,
) -> CliResult<()> {
    let form = load_form(&form_path)?;
    let config_json = component_config(&form, config)?;
    let mut answers: AnswerSet = serde_json::from_str(&read_answers(answers_path)?)?;
    let mut skipped = BTreeSet::new();
    let mut presenter = FillPresenter::new(Verbosity::from_verbose(verbose));

    loop {
        let payload = build_render_payload(&form, &answers);
        presenter.show_header(&payload);
        presenter.show_status(&payload);

        let visible: Vec<&RenderQuestion> = payload.visible().collect();
        let next = visible.iter().enumerate().find(|(_, question)| {
            !answers.is_answered(&question.field_id) && !skipped.contains(&question.field_id)
        });
        let Some((index, question)) = next else {
            let answers_json = serde_json::to_string(&answers)?;
            let body =
                parse_component_result(&map_submission(&form.id, &config_json, &answers_json))?;
            presenter.show_completion(&payload, &serde_json::to_string_pretty(&body)?);
            return Ok(());
        };

        presenter.show_prompt(question, index + 1, visible.len());
        match prompt_question(question, &presenter)? {
            Some(value) => {
                answers.insert(question.field_id.clone(), value);
            }
            None => {
                skipped.insert(question.field_id.clone());
            }
        }
    }
}

fn run_submit(form_path: PathBuf, answers_path: PathBuf, config: &ServiceConfig) -> CliResult<()> {
    let form = load_form(&form_path)?;
    let answers: AnswerSet = serde_json::from_str(&fs::read_to_string(answers_path)?)?;

    let credentials = InMemoryCredentials::new();
    credentials.insert(form.owner_id.clone(), credential_from_env()?);
    let service = FormService::new(
        config.clone(),
        InMemoryFormStore::new(),
        credentials,
        AirtableClient::from_config(config),
    );
    service.store().insert(form.clone())?;

    let receipt = service.submit(&form.id, &answers)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "form_id": receipt.form_id,
            "fields": receipt.fields,
        }))?
    );
    Ok(())
}

/// Reads a form definition once and checks it as if it were being published.
fn load_form(form_path: &Path) -> CliResult<FormDefinition> {
    let form: FormDefinition = serde_json::from_str(&fs::read_to_string(form_path)?)?;
    Ok(revalidate(&form)?)
}

fn component_config(form: &FormDefinition, config: &ServiceConfig) -> CliResult<String> {
    Ok(json!({
        "form_definition_json": serde_json::to_string(form)?,
        "service": config,
    })
    .to_string())
}

fn read_answers(path: Option<PathBuf>) -> CliResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok("{}".to_string()),
    }
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn prompt_question(
    question: &RenderQuestion,
    presenter: &FillPresenter,
) -> CliResult<Option<AnswerValue>> {
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err("input closed before the form was complete".into());
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("fill aborted by user".into());
        }

        match parse_answer(question, trimmed) {
            Ok(value) => return Ok(value),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

/// Turns raw input into an answer; blank input skips the question.
fn parse_answer(
    question: &RenderQuestion,
    raw: &str,
) -> Result<Option<AnswerValue>, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match question.kind {
        FieldType::ShortText | FieldType::LongText => Ok(Some(AnswerValue::Text(raw.to_string()))),
        FieldType::SingleSelect => parse_option(question, raw).map(|name| Some(AnswerValue::Text(name))),
        FieldType::MultiSelect => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| parse_option(question, item))
            .collect::<Result<Vec<_>, _>>()
            .map(|names| Some(AnswerValue::Many(names))),
        FieldType::AttachmentUrl => parse_url(raw).map(|url| Some(AnswerValue::Text(url))),
    }
}

fn parse_option(question: &RenderQuestion, raw: &str) -> Result<String, AnswerParseError> {
    question
        .options
        .iter()
        .find(|option| option.as_str() == raw)
        .or_else(|| {
            question
                .options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(raw))
        })
        .cloned()
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("'{}' is not one of the options.", raw),
                Some(question.options.join(", ")),
            )
        })
}

fn parse_url(raw: &str) -> Result<String, AnswerParseError> {
    if raw.starts_with("https://") || raw.starts_with("http://") {
        Ok(raw.to_string())
    } else {
        Err(AnswerParseError::new(
            "Please enter a public http(s) URL.",
            Some(InputKind::Url.hint().to_string()),
        ))
    }
}
