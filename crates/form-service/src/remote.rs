use std::collections::HashMap;

use form_spec::{BasesResponse, RecordPayload, TableRef, TablesResponse};
use serde_json::Value;
use thiserror::Error;

use crate::credentials::Credential;

/// Failure reported by the external table API or the transport in front of it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),
    /// The API answered with an error status; `body` may name offending fields.
    #[error("external API rejected the request with status {status}")]
    Rejected { status: u16, body: Value },
}

/// A record-creation call against one external table.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRequest {
    pub url: String,
    pub body: RecordPayload,
}

impl RecordRequest {
    pub fn new(api_base_url: &str, table: &TableRef, body: RecordPayload) -> Self {
        Self {
            url: format!(
                "{}/{}/{}",
                api_base_url.trim_end_matches('/'),
                table.base_id,
                table.table_id
            ),
            body,
        }
    }
}

/// Writes new rows to the external table.
pub trait RecordWriter {
    fn create_record(
        &self,
        credential: &Credential,
        request: &RecordRequest,
    ) -> Result<(), RemoteError>;
}

/// Reads the external workspace's bases and table schemas.
pub trait SchemaSource {
    fn bases(&self, credential: &Credential) -> Result<BasesResponse, RemoteError>;
    fn tables(&self, credential: &Credential, base_id: &str) -> Result<TablesResponse, RemoteError>;
}

/// Schema source backed by canned metadata responses.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    bases: BasesResponse,
    tables: HashMap<String, TablesResponse>,
}

impl StaticSchema {
    pub fn new(bases: BasesResponse) -> Self {
        Self {
            bases,
            tables: HashMap::new(),
        }
    }

    pub fn with_tables(mut self, base_id: impl Into<String>, tables: TablesResponse) -> Self {
        self.tables.insert(base_id.into(), tables);
        self
    }
}

impl SchemaSource for StaticSchema {
    fn bases(&self, _credential: &Credential) -> Result<BasesResponse, RemoteError> {
        Ok(self.bases.clone())
    }

    fn tables(&self, _credential: &Credential, base_id: &str) -> Result<TablesResponse, RemoteError> {
        self.tables.get(base_id).cloned().ok_or_else(|| RemoteError::Rejected {
            status: 404,
            body: serde_json::json!({ "error": { "type": "NOT_FOUND" } }),
        })
    }
}
