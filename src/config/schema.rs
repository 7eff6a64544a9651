//! Client configuration: `config.toml` plus environment overrides.

use crate::session::ProfileSelectionPolicy;
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8001/api";

const ENV_API_URL: &str = "STREAMFLIX_API_URL";
const ENV_DATA_DIR: &str = "STREAMFLIX_DATA_DIR";
const ENV_TIMEOUT_SECS: &str = "STREAMFLIX_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API, including the `/api` prefix.
    pub api_url: String,
    /// Bound applied to every request.
    pub request_timeout_secs: u64,
    /// Where the session token lives. `~` is expanded.
    pub data_dir: Option<String>,
    pub profile_selection: ProfileSelectionPolicy,
    /// Catalog language for titles and descriptions.
    pub language: String,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub playback: PlaybackConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: 15,
            data_dir: None,
            profile_selection: ProfileSelectionPolicy::default(),
            language: "en".into(),
            log_filter: "streamflix=warn".into(),
            playback: PlaybackConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Minimum movement between two progress reports.
    pub report_interval_secs: u64,
    /// Fraction of the runtime after which a movie counts as watched.
    pub completion_ratio: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 10,
            completion_ratio: 0.95,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "StreamFlix", "streamflix")
}

/// `<config_dir>/config.toml` for the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

impl ClientConfig {
    /// Load from `path`, else the default location if it exists, else defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(dir);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number, got '{raw}'"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("api_url must be an http(s) URL, got '{url}'");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        let ratio = self.playback.completion_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            bail!("playback.completion_ratio must be in (0, 1], got {ratio}");
        }
        if self.language.trim().is_empty() {
            bail!("language must not be empty");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the session token.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).into_owned())),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .context("Could not determine a data directory; set data_dir"),
        }
    }
}
