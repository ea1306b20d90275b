//! Layered project configuration.
//!
//! Three sources merge left-to-right with later sources overriding earlier:
//! the project-shared file, the project-local secret file, then process
//! environment variables. Read once per invocation; nothing is persisted.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Project-shared configuration file, intended to be committed.
pub const SHARED_FILE: &str = ".cleave.json";

/// Project-local secret file, intended to be gitignored.
pub const LOCAL_FILE: &str = ".cleave.local.json";

pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;

/// One configuration layer. Every field is optional so layers can be
/// merged field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigSource {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub ticket_base_url: Option<String>,
    pub commit_prefix: Option<String>,
    pub project_key: Option<String>,
}

impl ConfigSource {
    /// Merge `overlay` on top of `self`; set fields in the overlay win.
    pub fn merge(self, overlay: ConfigSource) -> ConfigSource {
        ConfigSource {
            provider: overlay.provider.or(self.provider),
            model: overlay.model.or(self.model),
            api_key: overlay.api_key.or(self.api_key),
            base_url: overlay.base_url.or(self.base_url),
            max_output_tokens: overlay.max_output_tokens.or(self.max_output_tokens),
            ticket_base_url: overlay.ticket_base_url.or(self.ticket_base_url),
            commit_prefix: overlay.commit_prefix.or(self.commit_prefix),
            project_key: overlay.project_key.or(self.project_key),
        }
    }

    /// Load one layer from a JSON file. A missing file is an empty layer;
    /// an unreadable or unparsable file is fatal.
    pub fn from_file(path: &Path) -> Result<Option<ConfigSource>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let source = serde_json::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(source))
    }

    /// Load the environment layer from `CLEAVE_*` variables.
    pub fn from_env() -> ConfigSource {
        ConfigSource {
            provider: env_var("CLEAVE_PROVIDER"),
            model: env_var("CLEAVE_MODEL"),
            api_key: env_var("CLEAVE_API_KEY"),
            base_url: env_var("CLEAVE_BASE_URL"),
            max_output_tokens: env_var("CLEAVE_MAX_TOKENS").and_then(|v| match v.parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("ignoring unparsable CLEAVE_MAX_TOKENS: {v}");
                    None
                }
            }),
            ticket_base_url: env_var("CLEAVE_TICKET_BASE_URL"),
            commit_prefix: env_var("CLEAVE_COMMIT_PREFIX"),
            project_key: env_var("CLEAVE_PROJECT_KEY"),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Fully merged configuration with defaults applied.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider identifier; resolved (with fallback) by the backend layer.
    pub provider: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_output_tokens: u32,
    pub ticket_base_url: Option<String>,
    pub commit_prefix: Option<String>,
    pub project_key: Option<String>,
}

impl Config {
    /// Load and merge all layers for a repository root.
    pub fn load(root: &Path) -> Result<Config, ConfigError> {
        let layers = [
            ConfigSource::from_file(&root.join(SHARED_FILE))?,
            ConfigSource::from_file(&root.join(LOCAL_FILE))?,
            Some(ConfigSource::from_env()),
        ];
        let merged = layers
            .into_iter()
            .flatten()
            .fold(ConfigSource::default(), ConfigSource::merge);
        Ok(Config::from_source(merged))
    }

    /// Apply defaults to a merged source.
    pub fn from_source(source: ConfigSource) -> Config {
        Config {
            provider: source
                .provider
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            model: source.model,
            api_key: source.api_key,
            base_url: source.base_url,
            max_output_tokens: source
                .max_output_tokens
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            ticket_base_url: source.ticket_base_url,
            commit_prefix: source.commit_prefix,
            project_key: source.project_key,
        }
    }
}
