//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Configuration files (TOML)
//! - Defaults

use crate::emit::Target;
use crate::error::{Error, Result};
use crate::format::{ExternalFormatter, Formatter, Passthrough};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub generate: GenerateConfig,

    #[serde(default)]
    pub format: FormatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Destination language
    #[serde(default)]
    pub target: Target,

    /// Definition read when no `--target-file` is given
    #[serde(default = "default_target_file")]
    pub target_file: PathBuf,

    /// Destination; defaults per target (`fsm_GEN.go`, `fsm_gen.rs`)
    pub dest_file: Option<PathBuf>,

    /// Embed the input digest in the generated header
    #[serde(default = "default_true")]
    pub digest: bool,
}

/// External formatter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Run the formatter after emission
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Command for Go output, program first
    pub go: Option<Vec<String>>,

    /// Command for Rust output, program first
    pub rust: Option<Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_target_file() -> PathBuf {
    PathBuf::from("fsm.toml")
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            target_file: default_target_file(),
            dest_file: None,
            digest: true,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            go: None,
            rust: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./fsmgen.toml
    /// 2. ~/.fsmgen/config.toml
    /// 3. /etc/fsmgen/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("fsmgen.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".fsmgen").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/fsmgen/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Destination file for `target`, configured or default
    pub fn dest_file(&self, target: Target) -> PathBuf {
        self.generate
            .dest_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(target.default_dest_file()))
    }

    /// Formatter to apply to `target` output
    pub fn formatter(&self, target: Target) -> Result<Box<dyn Formatter>> {
        if !self.format.enabled {
            return Ok(Box::new(Passthrough));
        }

        let command = match target {
            Target::Go => self.format.go.as_deref(),
            Target::Rust => self.format.rust.as_deref(),
        };

        Ok(match command {
            Some(command) => Box::new(ExternalFormatter::from_command(command)?),
            None => Box::new(ExternalFormatter::for_target(target)),
        })
    }
}
