//! Remote document service client.
//!
//! Defines the [`DocumentService`] trait (the three remote operations the
//! importer needs) and [`OutlineClient`], its implementation over the Outline
//! HTTP API using a blocking `reqwest` client.
//!
//! # Endpoints
//!
//! | Operation | Endpoint | Body |
//! |-----------|----------|------|
//! | [`create_folder_document`](DocumentService::create_folder_document) | `POST /api/documents.create` | JSON |
//! | [`import_file`](DocumentService::import_file) | `POST /api/documents.import` | multipart |
//! | [`list_collections`](DocumentService::list_collections) | `POST /api/collections.list` | JSON |
//!
//! Every request carries `Authorization: Bearer <token>`. A call succeeds
//! only on HTTP 200; `documents.create` and `collections.list` additionally
//! require `"ok": true` in the response. Nothing is retried.

use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::RemoteError;
use crate::models::{Collection, RemoteDocumentId};

/// Fixed page size for `collections.list`.
pub const COLLECTIONS_PAGE_SIZE: u32 = 100;

const CREATE_ENDPOINT: &str = "/api/documents.create";
const IMPORT_ENDPOINT: &str = "/api/documents.import";
const COLLECTIONS_ENDPOINT: &str = "/api/collections.list";

/// The remote operations the importer depends on.
///
/// Implementations are stateless apart from credentials; each call is an
/// independent blocking round trip and every failure is terminal for that
/// call.
pub trait DocumentService {
    /// Create an empty, unpublished document titled `name`. `parent` of
    /// `None` places it at the top level of the collection.
    fn create_folder_document(
        &self,
        name: &str,
        collection_id: &str,
        parent: Option<&RemoteDocumentId>,
    ) -> Result<RemoteDocumentId, RemoteError>;

    /// Upload a Markdown file as a published document.
    fn import_file(
        &self,
        path: &Path,
        collection_id: &str,
        parent: Option<&RemoteDocumentId>,
    ) -> Result<RemoteDocumentId, RemoteError>;

    /// List collections visible to the token (first page only).
    fn list_collections(&self) -> Result<Vec<Collection>, RemoteError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct DocumentData {
    #[serde(default)]
    id: String,
}

/// Blocking client for the Outline API.
pub struct OutlineClient {
    http: Client,
    host: String,
    token: String,
}

impl OutlineClient {
    /// Build a client for `host` (trailing `/` is ignored).
    ///
    /// `timeout` of `None` keeps the transport default.
    pub fn new(host: &str, token: &str, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| RemoteError::Transport {
            endpoint: host.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.host, endpoint)
    }

    fn post_json(&self, endpoint: &str, payload: &serde_json::Value) -> Result<String, RemoteError> {
        let url = self.url(endpoint);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .map_err(|e| transport_error(&url, e))?;
        read_success_body(&url, resp)
    }
}

impl DocumentService for OutlineClient {
    fn create_folder_document(
        &self,
        name: &str,
        collection_id: &str,
        parent: Option<&RemoteDocumentId>,
    ) -> Result<RemoteDocumentId, RemoteError> {
        let mut payload = serde_json::json!({
            "collectionId": collection_id,
            "title": name,
            "text": "",
            "template": false,
            "publish": false,
        });
        if let Some(parent) = parent {
            payload["parentDocumentId"] = serde_json::Value::String(parent.to_string());
        }

        debug!(folder = name, parent = ?parent.map(|p| p.as_str()), "creating folder document");
        let body = self.post_json(CREATE_ENDPOINT, &payload)?;
        let url = self.url(CREATE_ENDPOINT);
        let data: DocumentData = parse_ok_envelope(&url, &body)?;
        if data.id.is_empty() {
            return Err(RemoteError::NotOk {
                endpoint: url,
                body,
            });
        }
        debug!(folder = name, id = %data.id, "created folder document");

        Ok(RemoteDocumentId::new(data.id))
    }

    fn import_file(
        &self,
        path: &Path,
        collection_id: &str,
        parent: Option<&RemoteDocumentId>,
    ) -> Result<RemoteDocumentId, RemoteError> {
        let url = self.url(IMPORT_ENDPOINT);

        // The handle moves into the form and is dropped once the request
        // finishes, whatever the outcome.
        let file = File::open(path).map_err(|source| RemoteError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| RemoteError::File {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name)
            .mime_str("text/markdown")
            .map_err(|e| transport_error(&url, e))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("collectionId", collection_id.to_string());
        if let Some(parent) = parent {
            form = form.text("parentDocumentId", parent.to_string());
        }
        let form = form
            .text("template", "false")
            .text("publish", "true");

        debug!(file = %path.display(), parent = ?parent.map(|p| p.as_str()), url = %url, "importing file");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .map_err(|e| transport_error(&url, e))?;
        let body = read_success_body(&url, resp)?;
        debug!(file = %path.display(), response = %body, "imported file");

        // HTTP 200 is success here; the id is informational.
        let id = serde_json::from_str::<Envelope<DocumentData>>(&body)
            .ok()
            .and_then(|env| env.data)
            .map(|data| data.id)
            .unwrap_or_default();
        Ok(RemoteDocumentId::new(id))
    }

    fn list_collections(&self) -> Result<Vec<Collection>, RemoteError> {
        let payload = serde_json::json!({
            "offset": 0,
            "limit": COLLECTIONS_PAGE_SIZE,
        });

        debug!(url = %self.url(COLLECTIONS_ENDPOINT), "listing collections");
        let body = self.post_json(COLLECTIONS_ENDPOINT, &payload)?;
        parse_ok_envelope(&self.url(COLLECTIONS_ENDPOINT), &body)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> RemoteError {
    RemoteError::Transport {
        endpoint: url.to_string(),
        message: err.to_string(),
    }
}

fn read_success_body(url: &str, resp: Response) -> Result<String, RemoteError> {
    let status = resp.status();
    let body = resp.text().map_err(|e| transport_error(url, e))?;
    if status != StatusCode::OK {
        return Err(RemoteError::Status {
            endpoint: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn parse_ok_envelope<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, RemoteError> {
    let not_ok = || RemoteError::NotOk {
        endpoint: url.to_string(),
        body: body.to_string(),
    };
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|_| not_ok())?;
    if !envelope.ok {
        return Err(not_ok());
    }
    envelope.data.ok_or_else(not_ok)
}
