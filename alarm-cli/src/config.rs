//! Configuration loading and parsing
//!
//! Settings come from an optional TOML file, with built-in defaults
//! matching the original desk setup; command-line flags override both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Waterfall root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Builder names to poll, in order
    #[serde(default = "default_builds")]
    pub builds: Vec<String>,

    /// HTTP basic-auth username (prompted for when absent)
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Device path; auto-discovered when absent
    #[serde(default)]
    pub port: Option<String>,

    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Read timeout for acknowledgement lines
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Wait after opening the port, covering the device reboot
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Wait between sending a magnitude and reading its acknowledgement
    #[serde(default = "default_ack_delay_secs")]
    pub ack_delay_secs: u64,

    /// Wait between full passes over the build list
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_base_url() -> String {
    "https://reach-bb.k1k.me".to_string()
}

fn default_builds() -> Vec<String> {
    [
        "full",
        "webapp-only",
        "twisted-only",
        "style",
        "javascript",
        "build_dist",
        "noit_merged",
        "noit_java_only_old_iep",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_baud() -> u32 {
    19200
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_startup_delay_secs() -> u64 {
    10
}

fn default_ack_delay_secs() -> u64 {
    5
}

fn default_interval_secs() -> u64 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            builds: default_builds(),
            username: None,
            serial: SerialConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: default_baud(),
            timeout_secs: default_timeout_secs(),
            startup_delay_secs: default_startup_delay_secs(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            ack_delay_secs: default_ack_delay_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Apply command-line overrides on top of the file/default config
    pub fn apply_overrides(
        &mut self,
        port: Option<String>,
        baud: Option<u32>,
        timeout_secs: Option<u64>,
        base_url: Option<String>,
        username: Option<String>,
    ) {
        if port.is_some() {
            self.serial.port = port;
        }
        if let Some(baud) = baud {
            self.serial.baud = baud;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.serial.timeout_secs = timeout_secs;
        }
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if username.is_some() {
            self.username = username;
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config)
}
