use form_spec::{RenderPayload, RenderQuestion, RenderStatus, render::value_to_display};

/// Controls which bits of state the fill session prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Question prompts only.
    Clean,
    /// Prompts plus status and the currently visible questions.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Error returned when raw input cannot become an answer.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Prints prompts and progress while a respondent fills a form.
pub struct FillPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl FillPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_name);
        println!("Press enter to skip a question, type 'exit' to abort.");
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &RenderPayload) {
        if !self.verbosity.is_verbose() {
            return;
        }
        println!(
            "Status: {} ({}/{})",
            payload.status.as_str(),
            payload.progress.answered,
            payload.progress.total
        );
        println!("Visible questions:");
        for question in payload.visible() {
            let mut entry = format!(" - {} ({})", question.label, question.field_id);
            if let Some(value) = &question.current_value {
                entry.push_str(&format!(" = {}", value_to_display(value)));
            }
            println!("{}", entry);
        }
    }

    pub fn show_prompt(&self, question: &RenderQuestion, index: usize, total: usize) {
        println!(
            "{}/{} {} ({})",
            index,
            total,
            question.label,
            question.input.hint()
        );
        if !question.options.is_empty() {
            println!("Options: {}", question.options.join(", "));
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_completion(&self, payload: &RenderPayload, body: &str) {
        if payload.status == RenderStatus::Complete {
            println!("Done ✅");
        } else {
            println!("Done (some questions skipped)");
        }
        println!("Record payload:\n{}", body);
    }
}
