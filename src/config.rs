use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// User settings, stored as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the board API.
    pub api_base_url: String,
    /// Request timeout. Unset means the transport default.
    pub request_timeout_secs: Option<u64>,
    /// Estimate used for new tasks when none is given.
    pub default_estimate_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: None,
            default_estimate_minutes: 60,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Returns the path to the config file.
///
/// The path is determined in the following order:
/// 1. `FOCUSBOARD_CONFIG` environment variable.
/// 2. `~/.config/focusboard/config.json` (on Linux).
/// 3. `./config.json` (fallback).
pub fn config_path() -> PathBuf {
    std::env::var("FOCUSBOARD_CONFIG").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("focusboard");
        p.push("config.json");
        p
    })
}

/// Directory for the TUI log file.
pub fn log_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("focusboard");
    p
}

/// Loads the config file, falling back to defaults when it does not exist.
///
/// `FOCUSBOARD_API_URL` overrides the stored base URL.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();
    let mut config = if path.exists() {
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Io { path: path.clone(), source })?;
        serde_json::from_str(&s).map_err(|source| ConfigError::Parse { path: path.clone(), source })?
    } else {
        Config::default()
    };
    if let Ok(url) = std::env::var("FOCUSBOARD_API_URL") {
        if !url.trim().is_empty() {
            config.api_base_url = url;
        }
    }
    Ok(config)
}

/// Writes the config file, creating its directory if needed.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    let io_err = |source| ConfigError::Io { path: path.clone(), source };
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
    }
    let s = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(io_err)?;
    f.write_all(s.as_bytes()).map_err(io_err)?;
    Ok(())
}
