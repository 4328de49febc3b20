//! Layered settings: compiled defaults, then `acolyte-roster.toml`, then `ACOLYTES_*` env vars.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "acolyte-roster.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding one CSV file per sheet.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Whether the special day's non-central slots honour exclusion sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialDayExclusions {
    Enforce,
    Ignore,
}

/// Which stored assignment records a regeneration discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerationScope {
    All,
    Horizon,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Used when the Config sheet carries no `acolytes_per_mass` setting.
    #[serde(default = "default_acolytes_per_mass")]
    pub acolytes_per_mass: usize,
    /// Treat `acolytes_per_mass` as a hard cap instead of a soft target.
    #[serde(default)]
    pub enforce_per_mass_limit: bool,
    #[serde(default = "default_special_day_exclusions")]
    pub special_day_exclusions: SpecialDayExclusions,
    #[serde(default = "default_regeneration_scope")]
    pub regeneration_scope: RegenerationScope,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            acolytes_per_mass: default_acolytes_per_mass(),
            enforce_per_mass_limit: false,
            special_day_exclusions: default_special_day_exclusions(),
            regeneration_scope: default_regeneration_scope(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_acolytes_per_mass() -> usize {
    2
}

fn default_special_day_exclusions() -> SpecialDayExclusions {
    SpecialDayExclusions::Enforce
}

fn default_regeneration_scope() -> RegenerationScope {
    RegenerationScope::All
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Loads settings from `path` (or `./acolyte-roster.toml`) with env overrides.
/// A missing file is not an error; defaults apply.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let settings = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(file))
        .merge(env_provider())
        .extract()?;
    Ok(settings)
}

pub fn load_settings_from_str(toml_content: &str) -> Result<Settings> {
    let settings = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::string(toml_content))
        .extract()?;
    Ok(settings)
}

/// `ACOLYTES_GENERATION_ACOLYTES_PER_MASS` must land on `generation.acolytes_per_mass`,
/// so only the section prefix is turned into a dot.
fn env_provider() -> Env {
    Env::prefixed("ACOLYTES_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
