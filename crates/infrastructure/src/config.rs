use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, Map};
use domain::PollSettings;
use serde::{Deserialize, Serialize};

use crate::drivers::SerialSettings;

/// File picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_NAME: &str = "scale-logger";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_table_path")]
    pub table_path: PathBuf,
}

fn default_table_path() -> PathBuf {
    PathBuf::from("./TEST22.DBF")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            table_path: default_table_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("./error_log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialSettings,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layered load: built-in defaults, then the config file, then
    /// `SCALE__*` environment variables (e.g. SCALE__POLL__INTERVAL_MS=500).
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_file, None)
    }

    /// Same as [`AppConfig::load`], reading `SCALE__*` variables from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file = match config_file {
            // An explicit file must exist
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let s = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("SCALE")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        let config: Self = s.try_deserialize()?;
        config
            .poll
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }
}
