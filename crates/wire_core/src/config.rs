//! Runtime settings for the store, the model client and logging.
//!
//! # Responsibility
//! - Parse TOML settings and apply `WIRE_*` environment overrides.
//! - Reject settings the process cannot start with.
//!
//! # Invariants
//! - Environment values win over file values.
//! - Every section has defaults, so an empty file is valid.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_PROJECTS_CONTAINER: &str = "projects";
const DEFAULT_DOCUMENTS_CONTAINER: &str = "documents";
const DEFAULT_API_VERSION: &str = "2024-06-01";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ENV_STORE_PATH: &str = "WIRE_STORE_PATH";
const ENV_PROJECTS_CONTAINER: &str = "WIRE_PROJECTS_CONTAINER";
const ENV_DOCUMENTS_CONTAINER: &str = "WIRE_DOCUMENTS_CONTAINER";
const ENV_GENERATION_ENDPOINT: &str = "WIRE_GENERATION_ENDPOINT";
const ENV_GENERATION_API_KEY: &str = "WIRE_GENERATION_API_KEY";
const ENV_GENERATION_DEPLOYMENT: &str = "WIRE_GENERATION_DEPLOYMENT";
const ENV_GENERATION_API_VERSION: &str = "WIRE_GENERATION_API_VERSION";
const ENV_GENERATION_TIMEOUT_SECS: &str = "WIRE_GENERATION_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "WIRE_LOG_LEVEL";
const ENV_LOG_DIR: &str = "WIRE_LOG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Process-wide settings, owned by the entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub store: StoreSettings,
    /// Absent when text generation is not configured.
    pub generation: Option<GenerationSettings>,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// SQLite file; an in-memory database is used when unset.
    pub database_path: Option<PathBuf>,
    pub projects_container: String,
    pub documents_container: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            projects_container: DEFAULT_PROJECTS_CONTAINER.to_string(),
            documents_container: DEFAULT_DOCUMENTS_CONTAINER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GenerationSettings {
    fn empty() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
    /// Logging stays disabled when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl Settings {
    /// Reads `path`, applies process environment overrides and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings = toml::from_str(&raw)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses and validates settings without consulting the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Applies `WIRE_*` overrides resolved through `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.store.database_path = Some(PathBuf::from(path));
        }
        if let Some(name) = lookup(ENV_PROJECTS_CONTAINER) {
            self.store.projects_container = name;
        }
        if let Some(name) = lookup(ENV_DOCUMENTS_CONTAINER) {
            self.store.documents_container = name;
        }

        let endpoint = lookup(ENV_GENERATION_ENDPOINT);
        let api_key = lookup(ENV_GENERATION_API_KEY);
        let deployment = lookup(ENV_GENERATION_DEPLOYMENT);
        let api_version = lookup(ENV_GENERATION_API_VERSION);
        let timeout = lookup(ENV_GENERATION_TIMEOUT_SECS);
        let any_generation = endpoint.is_some()
            || api_key.is_some()
            || deployment.is_some()
            || api_version.is_some()
            || timeout.is_some();
        if any_generation {
            let generation = self
                .generation
                .get_or_insert_with(GenerationSettings::empty);
            if let Some(value) = endpoint {
                generation.endpoint = value;
            }
            if let Some(value) = api_key {
                generation.api_key = value;
            }
            if let Some(value) = deployment {
                generation.deployment = value;
            }
            if let Some(value) = api_version {
                generation.api_version = value;
            }
            if let Some(value) = timeout {
                generation.timeout_secs =
                    value.trim().parse().map_err(|_| ConfigError::Invalid {
                        key: ENV_GENERATION_TIMEOUT_SECS,
                        message: format!("expected whole seconds, got `{value}`"),
                    })?;
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let store = &self.store;
        require_non_empty("store.projects_container", &store.projects_container)?;
        require_non_empty("store.documents_container", &store.documents_container)?;
        if store.projects_container == store.documents_container {
            return Err(ConfigError::Invalid {
                key: "store.documents_container",
                message: "must differ from store.projects_container".to_string(),
            });
        }

        if let Some(generation) = &self.generation {
            require_non_empty("generation.endpoint", &generation.endpoint)?;
            require_non_empty("generation.api_key", &generation.api_key)?;
            require_non_empty("generation.deployment", &generation.deployment)?;
            require_non_empty("generation.api_version", &generation.api_version)?;
            if generation.timeout_secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "generation.timeout_secs",
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        normalize_level(&self.logging.level).map_err(|message| ConfigError::Invalid {
            key: "logging.level",
            message,
        })?;
        Ok(())
    }
}

fn require_non_empty(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
