//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pause between successive page requests, in milliseconds.
    ///
    /// Lives in config rather than as a module constant so tests (and
    /// impatient users) can turn it down to zero.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Destination directory for the JSON files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output mode: one file per storefront, or one merged file
    #[serde(default)]
    pub mode: OutputMode,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            proxy: None,
            output_dir: default_output_dir(),
            mode: OutputMode::PerStorefront,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("appstore-reviews").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("APPSTORE_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("APPSTORE_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }
}

/// Where the collected reviews end up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One `<app_id>-<code>.json` file per storefront.
    #[default]
    PerStorefront,
    /// A single deduplicated `<app_id>-all.json` file.
    Merged,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-storefront" | "per" => Ok(OutputMode::PerStorefront),
            "merged" | "single" => Ok(OutputMode::Merged),
            _ => Err(format!("Unknown output mode: {}. Use: per-storefront, merged", s)),
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::PerStorefront => write!(f, "per-storefront"),
            OutputMode::Merged => write!(f, "merged"),
        }
    }
}
