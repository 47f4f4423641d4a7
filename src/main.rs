//! # Outline Import CLI (`outline-import`)
//!
//! Uploads a folder of Markdown files into an Outline collection, creating one
//! empty document per directory so the hierarchy survives the move.
//!
//! ## Examples
//!
//! ```bash
//! # List collections visible to the token
//! OUTLINE_API_TOKEN=ol_api_... outline-import --list
//!
//! # Import a tree
//! outline-import --folder ./notes --collection 2f1c6a0e-... --debug
//!
//! # See what would be uploaded, without touching the service
//! outline-import --folder ./notes --collection 2f1c6a0e-... --dry-run
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use outline_import::client::OutlineClient;
use outline_import::collections;
use outline_import::config::{self, ImportSettings, Overrides, Settings, TOKEN_ENV_VAR};
use outline_import::importer::{self, Importer};
use outline_import::progress::ProgressMode;
use outline_import::walker;

/// Import a local tree of Markdown files into an Outline collection.
///
/// Flags override `OUTLINE_API_TOKEN`, which overrides the config file.
#[derive(Parser)]
#[command(
    name = "outline-import",
    about = "Import a folder of Markdown files into Outline, preserving the folder hierarchy",
    version
)]
struct Cli {
    /// Path to an optional TOML configuration file.
    ///
    /// Defaults to `./outline-import.toml` when that file exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder containing Markdown files.
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Outline host URL (default `https://app.getoutline.com`).
    #[arg(long)]
    host: Option<String>,

    /// Collection UUID to import documents into.
    #[arg(long)]
    collection: Option<String>,

    /// Outline API token. Falls back to `OUTLINE_API_TOKEN`.
    #[arg(long)]
    token: Option<String>,

    /// List collections and exit.
    #[arg(long)]
    list: bool,

    /// Walk the folder and print what would be imported, without any API call.
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,

    /// Enable debug logging.
    #[arg(long, visible_alias = "verbose")]
    debug: bool,

    /// Progress on stderr: `off`, `human`, or `json`.
    /// Defaults to `human` when stderr is a terminal.
    #[arg(long, value_enum)]
    progress: Option<ProgressMode>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cfg = config::load_or_default(cli.config.as_deref())?;
    let overrides = Overrides {
        folder: cli.folder.clone(),
        collection: cli.collection.clone(),
        host: cli.host.clone(),
        token: cli.token.clone(),
    };
    let env_token = std::env::var(TOKEN_ENV_VAR).ok();

    if cli.list {
        let settings = Settings::resolve(&cfg, &overrides, env_token)?;
        let client = OutlineClient::new(&settings.host, &settings.token, settings.timeout)?;
        collections::list_collections(&client).context("Error listing collections")?;
        return Ok(());
    }

    if cli.dry_run {
        let import = ImportSettings::resolve(&cfg, &overrides)?;
        let tasks = walker::scan_markdown(&import.folder, import.follow_symlinks)?;
        println!("import {} (dry-run)", import.folder.display());
        for task in &tasks {
            let folder = if task.relative_dir.is_empty() {
                "<root>"
            } else {
                task.relative_dir.as_str()
            };
            println!("  {}  (folder: {})", task.path.display(), folder);
        }
        println!("  files found: {}", tasks.len());
        return Ok(());
    }

    let settings = Settings::resolve(&cfg, &overrides, env_token)?;
    let import = ImportSettings::resolve(&cfg, &overrides)?;
    let client = OutlineClient::new(&settings.host, &settings.token, settings.timeout)?;

    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let report = Importer::new(&client)
        .with_progress(progress.reporter())
        .follow_symlinks(import.follow_symlinks)
        .run(&import.folder, &import.collection)
        .context("Error walking folder")?;

    importer::write_summary(&mut std::io::stdout().lock(), &import.folder, &report)?;
    Ok(())
}
