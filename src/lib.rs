//! # Outline Import
//!
//! Import a local tree of Markdown files into an Outline collection while
//! keeping the directory hierarchy.
//!
//! Every directory on the way to a Markdown file becomes an empty "folder"
//! document, and each file is uploaded as a child of the document for its
//! containing directory. Folder documents are created lazily and at most once
//! per run, however many files live under them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Walker  │──▶│   Importer   │──▶│   Resolver   │──▶│ Outline API  │
//! │ *.md     │   │ per-file run │   │ path → docId │   │ create/import│
//! └──────────┘   └──────┬───────┘   └──────────────┘   └──────▲───────┘
//!                       │                                     │
//!                       └─────────── import_file ─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! outline-import --list                                  # find a collection id
//! outline-import --folder ./notes --collection <uuid>    # import
//! outline-import --folder ./notes --collection <uuid> --dry-run
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and flag/env resolution |
//! | [`models`] | Core data types |
//! | [`error`] | Error kinds |
//! | [`client`] | Remote document service trait and Outline HTTP client |
//! | [`resolver`] | Folder path → document id resolution with memoization |
//! | [`walker`] | Markdown file discovery |
//! | [`importer`] | Import run orchestration |
//! | [`collections`] | Collection listing |
//! | [`progress`] | Progress reporting on stderr |

pub mod client;
pub mod collections;
pub mod config;
pub mod error;
pub mod importer;
pub mod models;
pub mod progress;
pub mod resolver;
pub mod walker;
