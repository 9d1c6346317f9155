use form_spec::{
    AnswerSet, DiscoveredField, DiscoveryError, FormDefinition, FormDraft, TableNames,
    ValidationError, base_and_table_names, find_table, map_submission, retain_visible,
    supported_fields, validate_form, visible_questions,
};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{HiddenAnswerPolicy, ServiceConfig};
use crate::credentials::{Credential, CredentialProvider};
use crate::remote::{RecordRequest, RecordWriter, RemoteError, SchemaSource};
use crate::store::{FormStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationError),
    #[error("form '{0}' not found")]
    NotFound(String),
    #[error("credentials for the owner of form '{0}' are not configured")]
    CredentialsMissing(String),
    #[error("submission failed, please retry")]
    SubmissionFailed,
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("external API call failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub form_id: String,
    /// Field ids written to the new record, in form order.
    pub fields: Vec<String>,
}

/// Form authoring, viewing, and submission over pluggable collaborators.
pub struct FormService<S, C, W> {
    config: ServiceConfig,
    store: S,
    credentials: C,
    writer: W,
}

impl<S, C, W> FormService<S, C, W>
where
    S: FormStore,
    C: CredentialProvider,
    W: RecordWriter,
{
    pub fn new(config: ServiceConfig, store: S, credentials: C, writer: W) -> Self {
        Self {
            config,
            store,
            credentials,
            writer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_form(
        &self,
        owner_id: &str,
        draft: &FormDraft,
    ) -> Result<FormDefinition, ServiceError> {
        let form = validate_form(Uuid::new_v4().to_string(), owner_id, draft)?;
        self.store.insert(form.clone())?;
        tracing::info!(form_id = %form.id, owner_id, questions = form.questions.len(), "created form");
        Ok(form)
    }

    /// Replaces the questions and rules of a form the caller owns.
    pub fn update_form(
        &self,
        owner_id: &str,
        form_id: &str,
        draft: &FormDraft,
    ) -> Result<FormDefinition, ServiceError> {
        self.get_form_for_edit(owner_id, form_id)?;
        let form = validate_form(form_id, owner_id, draft)?;
        self.store.update(form.clone())?;
        tracing::info!(form_id, owner_id, questions = form.questions.len(), "updated form");
        Ok(form)
    }

    pub fn list_forms(&self, owner_id: &str) -> Result<Vec<FormDefinition>, ServiceError> {
        Ok(self.store.list_by_owner(owner_id)?)
    }

    /// Public read used by form viewers and the submission path.
    pub fn get_form(&self, form_id: &str) -> Result<FormDefinition, ServiceError> {
        self.store
            .get(form_id)?
            .ok_or_else(|| ServiceError::NotFound(form_id.to_string()))
    }

    /// Owner-only read; forms owned by someone else are reported as missing.
    pub fn get_form_for_edit(
        &self,
        owner_id: &str,
        form_id: &str,
    ) -> Result<FormDefinition, ServiceError> {
        match self.store.get(form_id)? {
            Some(form) if form.owner_id == owner_id => Ok(form),
            _ => Err(ServiceError::NotFound(form_id.to_string())),
        }
    }

    pub fn visible_questions(
        &self,
        form_id: &str,
        answers: &AnswerSet,
    ) -> Result<Vec<String>, ServiceError> {
        let form = self.get_form(form_id)?;
        Ok(visible_questions(&form, answers)
            .into_iter()
            .map(|question| question.field_id.clone())
            .collect())
    }

    /// Maps the answers and writes them as one new row of the form's table.
    ///
    /// Failures of the write are logged with their detail and reported as
    /// [`ServiceError::SubmissionFailed`]; retrying is left to the caller.
    pub fn submit(
        &self,
        form_id: &str,
        answers: &AnswerSet,
    ) -> Result<SubmissionReceipt, ServiceError> {
        let form = self.get_form(form_id)?;
        let answers = match self.config.hidden_answers {
            HiddenAnswerPolicy::Clear => retain_visible(&form, answers),
            HiddenAnswerPolicy::Retain => answers.clone(),
        };
        let mapped = map_submission(&form, &answers);

        let credential = self
            .credentials
            .credential_for(&form.owner_id)
            .ok_or_else(|| ServiceError::CredentialsMissing(form.id.clone()))?;

        let request = RecordRequest::new(&self.config.api_base_url, &form.table, mapped.payload);
        if let Err(err) = self.writer.create_record(&credential, &request) {
            match &err {
                RemoteError::Rejected { status, body } => {
                    tracing::error!(form_id, status, body = %body, "external API rejected submission")
                }
                RemoteError::Transport(message) => {
                    tracing::error!(form_id, error = %message, "submission transport failure")
                }
            }
            return Err(ServiceError::SubmissionFailed);
        }

        tracing::info!(form_id, fields = mapped.present.len(), "submitted form");
        Ok(SubmissionReceipt {
            form_id: form.id,
            fields: mapped.present,
        })
    }
}

/// Supported fields of one external table, ready to become questions.
pub fn list_supported_fields(
    source: &dyn SchemaSource,
    credential: &Credential,
    base_id: &str,
    table_id: &str,
) -> Result<Vec<DiscoveredField>, ServiceError> {
    let tables = source.tables(credential, base_id)?;
    let table = find_table(&tables, table_id)?;
    Ok(supported_fields(table))
}

pub fn table_names(
    source: &dyn SchemaSource,
    credential: &Credential,
    base_id: &str,
    table_id: &str,
) -> Result<TableNames, ServiceError> {
    let bases = source.bases(credential)?;
    let tables = source.tables(credential, base_id)?;
    Ok(base_and_table_names(&bases, &tables, base_id, table_id)?)
}
