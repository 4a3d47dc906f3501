//! Configuration management for mcp-console
//!
//! Settings come from `config.toml` in the platform config directory, then
//! environment variables, then command-line flags, each layer overriding the
//! previous one. The result is resolved once at startup and handed to the
//! client; nothing reads the environment after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Checked in order; the first one set wins
pub const BASE_URL_ENV_VARS: [&str; 3] = ["MCP_CONSOLE_BASE_URL", "BASE_URL", "base_url"];

pub const USERNAME_ENV_VAR: &str = "MCP_CONSOLE_USERNAME";
pub const PASSWORD_ENV_VAR: &str = "MCP_CONSOLE_PASSWORD";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// Root URL of the access-control backend, e.g. `http://localhost:8000`
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Require a successful login before admin and chat commands run
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Config {
    /// Load configuration from `path`, or defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "mcp-console") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Save configuration to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay environment variables from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let from_env = BASE_URL_ENV_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
        if let Some(url) = from_env {
            self.backend.base_url = Some(url);
        }
    }

    /// The backend URL, with `cli_override` taking precedence
    pub fn base_url(&self, cli_override: Option<&str>) -> Result<BaseUrl> {
        let raw = cli_override
            .or(self.backend.base_url.as_deref())
            .with_context(|| {
                format!(
                    "no backend URL configured; pass --base-url, set {}, or add backend.base_url to the config file",
                    BASE_URL_ENV_VARS[0]
                )
            })?;
        raw.parse()
    }
}

/// Validated backend root with trailing slashes removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a relative endpoint such as `/roles/`
    pub fn join(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.0, endpoint)
        } else {
            format!("{}/{}", self.0, endpoint)
        }
    }
}

impl FromStr for BaseUrl {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let parsed =
            url::Url::parse(trimmed).with_context(|| format!("invalid backend URL '{}'", raw))?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self(trimmed.to_string())),
            other => anyhow::bail!("unsupported backend URL scheme '{}' in '{}'", other, raw),
        }
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
