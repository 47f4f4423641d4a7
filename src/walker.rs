//! Source tree enumeration.
//!
//! Walks the import root depth-first with entries sorted by file name, so the
//! order is stable across runs, and yields one [`ImportTask`] per Markdown
//! file. Directories are descended into but never yielded.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::TraversalError;
use crate::models::ImportTask;

/// Whether `file_name` ends in `.md`, ignoring ASCII case.
pub fn is_markdown(file_name: &str) -> bool {
    let bytes = file_name.as_bytes();
    bytes.len() >= 3 && bytes[bytes.len() - 3..].eq_ignore_ascii_case(b".md")
}

/// Iterator over the Markdown files under a root.
///
/// Tasks are produced lazily as the walk advances. Any error reading the tree
/// surfaces as an `Err` item; callers treat it as fatal.
pub struct MarkdownWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl MarkdownWalker {
    /// Start walking `root`. Fails up front if it is missing or not a directory.
    pub fn new(root: &Path, follow_symlinks: bool) -> Result<Self, TraversalError> {
        if !root.exists() {
            return Err(TraversalError::MissingRoot(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(TraversalError::NotADirectory(root.to_path_buf()));
        }

        let inner = WalkDir::new(root)
            .follow_links(follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        Ok(Self {
            root: root.to_path_buf(),
            inner,
        })
    }
}

impl Iterator for MarkdownWalker {
    type Item = Result<ImportTask, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(TraversalError::Walk { path, source }));
                }
            };

            // Symlinked files are uploaded even when links are not followed
            // for traversal.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            if !is_markdown(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            return Some(Ok(ImportTask {
                path: path.to_path_buf(),
                relative_dir: relative_dir(relative),
            }));
        }
    }
}

/// Containing directory of `relative`, joined with `/`. Empty at the root.
fn relative_dir(relative: &Path) -> String {
    relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    Component::Normal(seg) => Some(seg.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

/// Collect every task under `root`. Convenience for dry runs and tests.
pub fn scan_markdown(root: &Path, follow_symlinks: bool) -> Result<Vec<ImportTask>, TraversalError> {
    MarkdownWalker::new(root, follow_symlinks)?.collect()
}
