//! Error types for the import pipeline.
//!
//! Two kinds are fatal to a run ([`ConfigurationError`] and
//! [`TraversalError`]). The rest are per-path: [`FolderCreationError`] and
//! [`ImportError`] both wrap a [`RemoteError`] and are collected into the
//! [`ImportReport`](crate::models::ImportReport) instead of aborting.

use std::path::PathBuf;
use thiserror::Error;

/// A failed call to the remote document service.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request never produced a response (connect, TLS, I/O on the body).
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The service answered with a non-200 status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// HTTP 200, but the payload was unparseable or reported `ok: false`.
    #[error("{endpoint} rejected the request: {body}")]
    NotOk { endpoint: String, body: String },

    /// The local file to upload could not be read.
    #[error("reading {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// Raw response body, when the service produced one.
    pub fn body(&self) -> Option<&str> {
        match self {
            RemoteError::Status { body, .. } | RemoteError::NotOk { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Creating the folder-document for `path` failed.
#[derive(Error, Debug)]
#[error("creating folder '{path}': {source}")]
pub struct FolderCreationError {
    /// Cumulative folder path whose creation failed.
    pub path: String,
    #[source]
    pub source: RemoteError,
}

/// Uploading a single Markdown file failed.
#[derive(Error, Debug)]
#[error("importing {}: {source}", path.display())]
pub struct ImportError {
    pub path: PathBuf,
    #[source]
    pub source: RemoteError,
}

/// The source tree could not be enumerated. Aborts the run.
#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("import folder does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("import folder is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("walking {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Required settings are missing or invalid. Reported before any remote call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error(
        "Outline API token must be provided via --token, the OUTLINE_API_TOKEN environment variable, or remote.token in the config file"
    )]
    MissingToken,

    #[error(
        "a valid collection UUID must be provided via --collection (or import.collection), or use --list to view collections"
    )]
    MissingCollection,

    #[error("invalid host '{0}': must start with http:// or https://")]
    InvalidHost(String),

    #[error("remote.timeout_secs must be > 0")]
    ZeroTimeout,
}
