//! Client configuration.
//!
//! Layered: built-in defaults, then `~/.config/tzplan/config.toml`, then
//! `TZPLAN_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TzPlanError, TzPlanResult};
use crate::timezone::DEFAULT_TIMEZONE;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ENV_PREFIX: &str = "TZPLAN";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST backend, including any `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Zone used for display when no profile is selected.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Profile to select on startup instead of the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: default_api_url(),
            default_timezone: default_timezone(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_profile: None,
        }
    }
}

impl ClientConfig {
    pub fn config_path() -> TzPlanResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TzPlanError::Config("Could not determine config directory".into()))?
            .join("tzplan");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented config file on
    /// first run.
    pub fn load() -> TzPlanResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) with environment overrides.
    pub fn load_from(path: &Path) -> TzPlanResult<Self> {
        Self::load_layers(path, Some(environment()))
    }

    /// Load only what the file at `path` says, ignoring `TZPLAN_*`
    /// variables. Use this before writing the file back.
    pub fn load_file_only(path: &Path) -> TzPlanResult<Self> {
        Self::load_layers(path, None)
    }

    fn load_layers(path: &Path, env: Option<Environment>) -> TzPlanResult<Self> {
        let mut builder = Config::builder().add_source(File::from(path).required(false));
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let config: ClientConfig = builder
            .build()
            .map_err(|e| TzPlanError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TzPlanError::Config(e.to_string()))?;

        config.check()?;
        Ok(config)
    }

    /// Set `default_profile` in the file at `path`. Other lines, comments
    /// included, are kept as written, and no defaults or `TZPLAN_*`
    /// overrides are added.
    pub fn remember_profile(path: &Path, profile_id: &str) -> TzPlanResult<()> {
        let existing = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(TzPlanError::Config(format!("Could not read config file: {e}")));
            }
        };

        // Refuse to rewrite a file that does not parse.
        existing
            .parse::<toml::Table>()
            .map_err(|e| TzPlanError::Config(e.to_string()))?;

        let setting = format!(
            "default_profile = {}",
            toml::Value::String(profile_id.to_string())
        );

        let mut replaced = false;
        let mut lines: Vec<String> = existing
            .lines()
            .map(|line| {
                if !replaced && sets_key(line, "default_profile") {
                    replaced = true;
                    setting.clone()
                } else {
                    line.to_string()
                }
            })
            .collect();
        if !replaced {
            lines.push(setting);
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        write_config(path, &contents)
    }

    fn check(&self) -> TzPlanResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(TzPlanError::Config("api_url must not be empty".into()));
        }
        crate::timezone::parse_zone(&self.default_timezone)
            .map_err(|e| TzPlanError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Save the current config, replacing the file at `path`.
    pub fn save(&self, path: &Path) -> TzPlanResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TzPlanError::Config(e.to_string()))?;

        write_config(path, &content)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TzPlanResult<()> {
        let contents = format!(
            "\
# tzplan configuration

# Backend base URL (TZPLAN_API_URL overrides this):
# api_url = \"{}\"

# Zone used when no profile is selected:
# default_timezone = \"{}\"

# Seconds before a request is abandoned:
# request_timeout_secs = {}

# Profile id to select on startup:
# default_profile = \"\"
",
            DEFAULT_API_URL, DEFAULT_TIMEZONE, DEFAULT_TIMEOUT_SECS
        );

        write_config(path, &contents)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

/// Whether `line` assigns `key` (ignoring comments).
fn sets_key(line: &str, key: &str) -> bool {
    line.trim_start()
        .strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

fn write_config(path: &Path, contents: &str) -> TzPlanResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            TzPlanError::Config(format!("Could not create config directory: {e}"))
        })?;
    }

    std::fs::write(path, contents)
        .map_err(|e| TzPlanError::Config(format!("Could not write config file: {e}")))
}
