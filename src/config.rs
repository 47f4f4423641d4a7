//! Configuration loading and resolution.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags
//! 2. the `OUTLINE_API_TOKEN` environment variable (token only)
//! 3. an optional TOML file
//!
//! ```toml
//! [remote]
//! host = "https://app.getoutline.com"
//! token = "ol_api_..."
//! timeout_secs = 30
//!
//! [import]
//! folder = "./notes"
//! collection = "2f1c6a0e-..."
//! follow_symlinks = false
//! ```
//!
//! [`Settings::resolve`] validates the merged result before any remote call.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigurationError;

pub const DEFAULT_HOST: &str = "https://app.getoutline.com";
pub const DEFAULT_FOLDER: &str = "output_paper_markdown";
pub const DEFAULT_CONFIG_PATH: &str = "./outline-import.toml";
pub const TOKEN_ENV_VAR: &str = "OUTLINE_API_TOKEN";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            timeout_secs: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImportConfig {
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            collection: None,
            follow_symlinks: false,
        }
    }
}

fn default_folder() -> PathBuf {
    PathBuf::from(DEFAULT_FOLDER)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    Ok(config)
}

/// Load `path` if given, else the default file if it exists, else defaults.
///
/// An explicitly named file that cannot be read is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_config(default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Values supplied on the command line. `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub folder: Option<PathBuf>,
    pub collection: Option<String>,
    pub host: Option<String>,
    pub token: Option<String>,
}

/// Fully resolved settings for talking to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub token: String,
    pub timeout: Option<Duration>,
}

/// Fully resolved settings for an import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub folder: PathBuf,
    pub collection: String,
    pub follow_symlinks: bool,
}

impl Settings {
    /// Merge flags, environment, and file into connection settings.
    ///
    /// `env_token` is the value of [`TOKEN_ENV_VAR`], passed in so callers
    /// (and tests) control the environment.
    pub fn resolve(
        config: &Config,
        overrides: &Overrides,
        env_token: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let host = overrides
            .host
            .clone()
            .unwrap_or_else(|| config.remote.host.clone());
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(ConfigurationError::InvalidHost(host));
        }

        let token = non_empty(overrides.token.clone())
            .or_else(|| non_empty(env_token))
            .or_else(|| non_empty(config.remote.token.clone()))
            .ok_or(ConfigurationError::MissingToken)?;

        let timeout = match config.remote.timeout_secs {
            Some(0) => return Err(ConfigurationError::ZeroTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            host,
            token,
            timeout,
        })
    }
}

impl ImportSettings {
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self, ConfigurationError> {
        let collection = non_empty(overrides.collection.clone())
            .or_else(|| non_empty(config.import.collection.clone()))
            .ok_or(ConfigurationError::MissingCollection)?;

        let folder = overrides
            .folder
            .clone()
            .unwrap_or_else(|| config.import.folder.clone());

        Ok(Self {
            folder,
            collection,
            follow_symlinks: config.import.follow_symlinks,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
