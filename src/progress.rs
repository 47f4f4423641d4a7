//! Import progress reporting.
//!
//! Progress is written to **stderr** so stdout stays parseable for scripts
//! (the collection listing and the final summary go to stdout).

use std::io::Write;
use std::path::Path;

/// A single progress event for an import run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportProgressEvent {
    /// The source tree is being walked. Total unknown.
    Walking { root: String },
    /// The n-th Markdown file (1-based) is being imported.
    Importing { n: u64, path: String },
    /// The run finished.
    Done { succeeded: u64, failed: u64 },
}

impl ImportProgressEvent {
    pub fn importing(n: u64, path: &Path) -> Self {
        ImportProgressEvent::Importing {
            n,
            path: path.display().to_string(),
        }
    }
}

/// Receives progress events from the importer.
pub trait ImportProgressReporter {
    fn report(&self, event: ImportProgressEvent);
}

/// Human-friendly progress on stderr: "import  #1,234  docs/guide.md".
pub struct StderrProgress;

impl ImportProgressReporter for StderrProgress {
    fn report(&self, event: ImportProgressEvent) {
        let line = match &event {
            ImportProgressEvent::Walking { root } => format!("import {}  walking...\n", root),
            ImportProgressEvent::Importing { n, path } => {
                format!("import  #{}  {}\n", format_number(*n), path)
            }
            ImportProgressEvent::Done { succeeded, failed } => format!(
                "import  done  {} imported, {} failed\n",
                format_number(*succeeded),
                format_number(*failed)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ImportProgressReporter for JsonProgress {
    fn report(&self, event: ImportProgressEvent) {
        let obj = match &event {
            ImportProgressEvent::Walking { root } => serde_json::json!({
                "event": "progress",
                "phase": "walking",
                "root": root,
            }),
            ImportProgressEvent::Importing { n, path } => serde_json::json!({
                "event": "progress",
                "phase": "importing",
                "n": n,
                "path": path,
            }),
            ImportProgressEvent::Done { succeeded, failed } => serde_json::json!({
                "event": "done",
                "succeeded": succeeded,
                "failed": failed,
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ImportProgressReporter for NoProgress {
    fn report(&self, _event: ImportProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ImportProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
