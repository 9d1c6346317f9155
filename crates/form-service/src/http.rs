use form_spec::{BasesResponse, TablesResponse};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::credentials::Credential;
use crate::remote::{RecordRequest, RecordWriter, RemoteError, SchemaSource};

/// Blocking client for the external table API: record creation plus the
/// base and table metadata endpoints.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    api_base_url: String,
    client: Client,
}

impl AirtableClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        url: &str,
        offset: Option<&str>,
    ) -> Result<T, RemoteError> {
        let mut request = self.client.get(url);
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset)]);
        }
        let response = send(authorized(request, credential))?;
        response
            .json()
            .map_err(|err| RemoteError::Transport(format!("invalid response body from {url}: {err}")))
    }
}

fn authorized(request: RequestBuilder, credential: &Credential) -> RequestBuilder {
    request.header(AUTHORIZATION, credential.authorization_header())
}

/// Sends the request, turning error statuses into `Rejected` with the body kept.
fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request
        .send()
        .map_err(|err| RemoteError::Transport(err.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response
        .text()
        .map_err(|err| RemoteError::Transport(err.to_string()))?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        body,
    })
}

impl RecordWriter for AirtableClient {
    fn create_record(
        &self,
        credential: &Credential,
        request: &RecordRequest,
    ) -> Result<(), RemoteError> {
        tracing::debug!(url = %request.url, fields = request.body.fields.len(), "creating record");
        send(authorized(self.client.post(&request.url), credential).json(&request.body))?;
        Ok(())
    }
}

impl SchemaSource for AirtableClient {
    /// Lists every base, following `offset` until the API stops returning one.
    fn bases(&self, credential: &Credential) -> Result<BasesResponse, RemoteError> {
        let url = format!("{}/meta/bases", self.api_base_url);
        let mut collected = BasesResponse::default();
        let mut offset: Option<String> = None;
        loop {
            let page: BasesResponse = self.get_json(credential, &url, offset.as_deref())?;
            collected.bases.extend(page.bases);
            match page.offset {
                Some(next) if offset.as_deref() != Some(next.as_str()) => offset = Some(next),
                _ => break,
            }
        }
        tracing::debug!(bases = collected.bases.len(), "listed bases");
        Ok(collected)
    }

    fn tables(&self, credential: &Credential, base_id: &str) -> Result<TablesResponse, RemoteError> {
        let url = format!("{}/meta/bases/{}/tables", self.api_base_url, base_id);
        self.get_json(credential, &url, None)
    }
}
