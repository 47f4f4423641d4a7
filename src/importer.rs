//! Import orchestration.
//!
//! Coordinates one run: walk the source tree → resolve each file's
//! containing folder → upload the file under it. Folder and upload failures
//! are recorded per file and the walk carries on; only a traversal error
//! stops the run.

use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::client::DocumentService;
use crate::error::{ImportError, TraversalError};
use crate::models::{FileFailure, ImportReport};
use crate::progress::{ImportProgressEvent, ImportProgressReporter, NoProgress};
use crate::resolver::FolderResolver;
use crate::walker::MarkdownWalker;

/// Drives a single import of a Markdown tree into one collection.
pub struct Importer<'a> {
    service: &'a dyn DocumentService,
    progress: Box<dyn ImportProgressReporter>,
    follow_symlinks: bool,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a dyn DocumentService) -> Self {
        Self {
            service,
            progress: Box::new(NoProgress),
            follow_symlinks: false,
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ImportProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Import every Markdown file under `root` into `collection_id`.
    ///
    /// Each run starts with an empty folder cache. Returns the number of
    /// files uploaded and every per-file failure; the only error is a
    /// [`TraversalError`], which aborts the run where it happens.
    pub fn run(&self, root: &Path, collection_id: &str) -> Result<ImportReport, TraversalError> {
        self.progress.report(ImportProgressEvent::Walking {
            root: root.display().to_string(),
        });
        let walker = MarkdownWalker::new(root, self.follow_symlinks)?;

        let mut resolver = FolderResolver::new(self.service);
        let mut report = ImportReport::default();
        let mut n = 0u64;

        for task in walker {
            let task = task?;
            n += 1;
            self.progress
                .report(ImportProgressEvent::importing(n, &task.path));
            debug!(file = %task.path.display(), folder = %task.relative_dir, "processing markdown file");

            let parent = match resolver.resolve(&task.relative_dir, collection_id) {
                Ok(parent) => parent,
                Err(error) => {
                    warn!(
                        folder = %task.relative_dir,
                        error = %error,
                        "error creating folder, importing without parent"
                    );
                    report.failures.push(FileFailure::Folder {
                        file: task.path.clone(),
                        error,
                    });
                    None
                }
            };

            match self
                .service
                .import_file(&task.path, collection_id, parent.as_ref())
            {
                Ok(_) => report.succeeded += 1,
                Err(source) => {
                    warn!(file = %task.path.display(), error = %source, "error importing file");
                    report.failures.push(FileFailure::Import(ImportError {
                        path: task.path,
                        source,
                    }));
                }
            }
        }

        info!(
            imported = report.succeeded,
            failures = report.failures.len(),
            folders = resolver.cache().len(),
            "import finished"
        );
        self.progress.report(ImportProgressEvent::Done {
            succeeded: report.succeeded,
            failed: report.failed_imports() as u64,
        });

        Ok(report)
    }
}

/// Print the end-of-run summary block.
pub fn write_summary(out: &mut impl Write, root: &Path, report: &ImportReport) -> std::io::Result<()> {
    writeln!(out, "import {}", root.display())?;
    writeln!(out, "  imported: {}", report.succeeded)?;
    writeln!(out, "  failed: {}", report.failed_imports())?;
    if !report.failures.is_empty() {
        writeln!(out, "  problems:")?;
        for failure in &report.failures {
            writeln!(out, "    {}", failure)?;
        }
    }
    writeln!(out, "ok")?;
    Ok(())
}
