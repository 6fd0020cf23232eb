//! Engine configuration (layered: defaults < config file < env).

use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{CadreError, Result};

pub const DEFAULT_MAX_ROUND_TRIPS: usize = 20;
pub const MAX_ROUND_TRIPS_ENV: &str = "CADRE_MAX_ROUND_TRIPS";
pub const TOOL_TIMEOUT_MS_ENV: &str = "CADRE_TOOL_TIMEOUT_MS";

/// Limits applied to every run of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model sends allowed per run before it fails with `TurnLimitExceeded`.
    #[builder(default = DEFAULT_MAX_ROUND_TRIPS)]
    pub max_round_trips: usize,
    /// Per-call executor budget in milliseconds. Unbounded when unset.
    pub tool_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
            tool_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_round_trips == 0 {
            return Err(CadreError::Configuration(
                "max_round_trips must be at least 1".into(),
            ));
        }
        if self.tool_timeout_ms == Some(0) {
            return Err(CadreError::Configuration(
                "tool_timeout_ms must be positive when set".into(),
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| CadreError::Configuration(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file. A missing file yields `None`.
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Self::from_toml_str(&raw).map(Some)
    }

    /// Defaults overlaid with `CADRE_*` environment variables (and `.env`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; zero or unparsable values are ignored.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(limit) = lookup(MAX_ROUND_TRIPS_ENV).and_then(|v| parse_positive(&v)) {
            self.max_round_trips = limit as usize;
        }
        if let Some(ms) = lookup(TOOL_TIMEOUT_MS_ENV).and_then(|v| parse_positive(&v)) {
            self.tool_timeout_ms = Some(ms);
        }
        self
    }

    /// `~/.cadre/config.toml`.
    pub fn config_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".cadre"))
            .unwrap_or_else(|| PathBuf::from(".cadre"))
            .join("config.toml")
    }

    /// Defaults, then the user config file, then the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base = Self::load_file(&Self::config_path())?.unwrap_or_default();
        Ok(base.apply_env_with(|key| std::env::var(key).ok()))
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    let parsed = value.trim().parse::<u64>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}
