//! Core data types that flow through the import pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{FolderCreationError, ImportError};

/// Opaque document identifier issued by the remote service. Never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteDocumentId(String);

impl RemoteDocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteDocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized, forward-slash relative folder path used as the folder cache key.
///
/// Backslashes are treated as separators, and empty and `.` segments are
/// dropped, so `a\b/`, `./a/b` and `a//b` all compare equal to `a/b`. A path
/// with no segments left is not a folder: [`FolderPath::parse`] returns `None`
/// and the file belongs at the collection root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderPath(String);

impl FolderPath {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .replace('\\', "/")
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect::<Vec<_>>()
            .join("/");
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Each cumulative prefix, root to leaf, paired with its last segment.
    ///
    /// `a/b/c` yields `("a", "a")`, `("b", "a/b")`, `("c", "a/b/c")`.
    pub fn prefixes(&self) -> Vec<(&str, FolderPath)> {
        let mut out = Vec::new();
        let mut cumulative = String::new();
        for seg in self.segments() {
            if !cumulative.is_empty() {
                cumulative.push('/');
            }
            cumulative.push_str(seg);
            out.push((seg, FolderPath(cumulative.clone())));
        }
        out
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A collection as returned by `collections.list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One Markdown file discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTask {
    /// Path to the file on disk (the root joined with the relative path).
    pub path: PathBuf,
    /// Containing directory relative to the import root, `/`-separated.
    /// Empty for files directly under the root.
    pub relative_dir: String,
}

impl ImportTask {
    pub fn folder(&self) -> Option<FolderPath> {
        FolderPath::parse(&self.relative_dir)
    }
}

/// A per-file problem recorded during a run.
#[derive(Debug)]
pub enum FileFailure {
    /// The file's folder chain could not be created. The file was still
    /// imported (or attempted) without a parent.
    Folder {
        file: PathBuf,
        error: FolderCreationError,
    },
    /// The upload itself failed.
    Import(ImportError),
}

impl FileFailure {
    pub fn file(&self) -> &Path {
        match self {
            FileFailure::Folder { file, .. } => file,
            FileFailure::Import(err) => &err.path,
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFailure::Folder { file, error } => {
                write!(f, "{}: {}", file.display(), error)
            }
            FileFailure::Import(err) => write!(f, "{}", err),
        }
    }
}

/// Outcome of one import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Files uploaded successfully (with or without their intended parent).
    pub succeeded: u64,
    /// Folder and upload failures, in the order they happened.
    pub failures: Vec<FileFailure>,
}

impl ImportReport {
    pub fn failed_imports(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, FileFailure::Import(_)))
            .count()
    }
}
