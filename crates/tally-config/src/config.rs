//! Configuration types and loading for tally.
//!
//! The main entry point is [`TallyConfig`], the contents of
//! `.tally/config.yaml`. Values are layered with `figment`: built-in
//! defaults, then the YAML file, then `TALLY_*` environment variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the configuration inside `.tally/`.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const ENV_PREFIX: &str = "TALLY_";

/// Keys that may be set through `TALLY_<KEY>` variables.
const ENV_KEYS: &[&str] = &["user", "database", "log_tracking"];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration could not be serialized as YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Layered extraction failed (bad YAML or a mistyped env value).
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    /// The `.tally/` directory was not found.
    #[error("no .tally directory found (run 'tally init' first)")]
    TallyDirNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// TallyConfig
// ---------------------------------------------------------------------------

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Default user scope when `--user` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Database file, relative to the `.tally/` directory unless absolute.
    pub database: String,

    /// Whether the daily log (mood, notes, custom fields) is enabled.
    pub log_tracking: bool,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            user: None,
            database: "tally.db".to_string(),
            log_tracking: true,
        }
    }
}

impl TallyConfig {
    /// Every key accepted by [`get`](Self::get) and [`set`](Self::set).
    pub const KEYS: &'static [&'static str] = &["user", "database", "log_tracking"];

    /// Resolves the database path against the project directory.
    pub fn database_path(&self, tally_dir: &Path) -> PathBuf {
        let db = Path::new(&self.database);
        if db.is_absolute() {
            db.to_path_buf()
        } else {
            tally_dir.join(db)
        }
    }

    /// Reads a value by key as a display string.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match key {
            "user" => Ok(self.user.clone()),
            "database" => Ok(Some(self.database.clone())),
            "log_tracking" => Ok(Some(self.log_tracking.to_string())),
            _ => Err(unknown_key(key)),
        }
    }

    /// Sets a value by key, parsing it for the key's type.
    ///
    /// An empty value clears `user`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "user" => {
                self.user = (!value.is_empty()).then(|| value.to_string());
            }
            "database" => {
                if value.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: key.into(),
                        reason: "must not be empty".into(),
                    });
                }
                self.database = value.to_string();
            }
            "log_tracking" => {
                self.log_tracking = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.into(),
                    reason: format!("expected true or false, got '{value}'"),
                })?;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        reason: format!("unknown key (expected one of: {})", TallyConfig::KEYS.join(", ")),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Loading and saving
// ---------------------------------------------------------------------------

/// Loads `<tally_dir>/config.yaml` layered under `TALLY_*` variables.
///
/// A missing or empty file yields defaults.
pub fn load_config(tally_dir: &Path) -> Result<TallyConfig> {
    layered(Some(&tally_dir.join(CONFIG_FILE_NAME)))
}

/// Defaults layered under `TALLY_*` variables, for use outside a project.
pub fn load_env_config() -> Result<TallyConfig> {
    layered(None)
}

fn layered(file: Option<&Path>) -> Result<TallyConfig> {
    let mut figment = Figment::from(Serialized::defaults(TallyConfig::default()));
    if let Some(path) = file {
        if path.exists() && !std::fs::read_to_string(path)?.trim().is_empty() {
            figment = figment.merge(Yaml::file(path));
        }
    }
    let config: TallyConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).only(ENV_KEYS))
        .extract()?;
    Ok(config)
}

/// Reads only `<tally_dir>/config.yaml`, without environment overrides.
///
/// Used when editing the file so env values are not persisted.
pub fn read_config_file(tally_dir: &Path) -> Result<TallyConfig> {
    let path = tally_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(TallyConfig::default());
    }
    let content = std::fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(TallyConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Writes `config` to `<tally_dir>/config.yaml`, creating the directory.
pub fn save_config(tally_dir: &Path, config: &TallyConfig) -> Result<()> {
    std::fs::create_dir_all(tally_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(tally_dir.join(CONFIG_FILE_NAME), yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
