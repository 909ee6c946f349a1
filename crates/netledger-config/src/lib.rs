//! Configuration for the netledger CLI.
//!
//! A small TOML file at the platform config directory, layered with
//! `NETLEDGER_`-prefixed environment variables. Command-line flags are
//! applied on top by the binary.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix for overrides (`NETLEDGER_DATA_FILE`, ...).
pub const ENV_PREFIX: &str = "NETLEDGER_";

const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];
const COLOR_MODES: &[&str] = &["auto", "always", "never"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{0}' (expected data_file, backup_dir, output or color)")]
    UnknownKey(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// State file location. Defaults to `state.json` in the platform
    /// data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Where `backup` writes when no explicit path is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            backup_dir: None,
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String, ConfigError> {
    if allowed.contains(&value) {
        Ok(value.to_owned())
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
        })
    }
}

impl Config {
    /// The state file to use, falling back to the platform default.
    pub fn data_file_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(default_data_file)
    }

    /// The directory for new backups, falling back to the current one.
    pub fn backup_dir_path(&self) -> PathBuf {
        self.backup_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Check enumerated values that serde accepts as plain strings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        one_of("output", &self.output, OUTPUT_FORMATS)?;
        one_of("color", &self.color, COLOR_MODES)?;
        Ok(())
    }

    /// Set one key from its string form, as used by `config set`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "data_file" => self.data_file = non_empty_path(value),
            "backup_dir" => self.backup_dir = non_empty_path(value),
            "output" => self.output = one_of("output", value, OUTPUT_FORMATS)?,
            "color" => self.color = one_of("color", value, COLOR_MODES)?,
            other => return Err(ConfigError::UnknownKey(other.into())),
        }
        Ok(())
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "netledger", "netledger")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "netledger", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default state file location.
pub fn default_data_file() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "netledger", "state.json"]),
        |dirs| dirs.data_dir().join("state.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from an explicit file path plus environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}
