//! Configuration for vispipe-rs
//!
//! Two layers:
//! - `ExecutiveConfig`: handed to every executive at construction and kept
//!   for its lifetime (release-data default, reentrancy mode, loop bound),
//! - `PipelineConfig`: the file-level settings a binary loads at startup
//!   (log filter plus the executive defaults).
//!
//! # Files
//!
//! Configuration files are TOML (`.toml`) or JSON (anything else). Missing
//! fields take their defaults, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```ignore
//! use vispipe_rs::config::PipelineConfig;
//!
//! let config = PipelineConfig::load_or_default("vispipe.toml");
//! let mut pipeline = Pipeline::new(config.executive.clone());
//! ```

use crate::error::{Result, VisPipeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,vispipe_rs=debug";

/// Default bound on continue-executing passes per update
pub const DEFAULT_MAX_CONTINUE_EXECUTIONS: u32 = 64;

/// Per-executive settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveConfig {
    /// Initial release flag of every output: consumers discard the data
    /// after they execute
    #[serde(default)]
    pub release_data: bool,

    /// Panic on a reentrant request instead of returning an error
    #[serde(default)]
    pub fatal_reentrancy: bool,

    /// Upper bound on passes when a node keeps asking to continue
    #[serde(default = "default_max_continue_executions")]
    pub max_continue_executions: u32,
}

fn default_max_continue_executions() -> u32 {
    DEFAULT_MAX_CONTINUE_EXECUTIONS
}

impl Default for ExecutiveConfig {
    fn default() -> Self {
        Self {
            release_data: false,
            fatal_reentrancy: false,
            max_continue_executions: DEFAULT_MAX_CONTINUE_EXECUTIONS,
        }
    }
}

impl ExecutiveConfig {
    /// Settings for test builds: reentrancy aborts.
    pub fn strict() -> Self {
        Self {
            fatal_reentrancy: true,
            ..Self::default()
        }
    }

    pub fn with_release_data(mut self, release: bool) -> Self {
        self.release_data = release;
        self
    }
}

/// File-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `tracing-subscriber` env filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Defaults for every executive created from this configuration
    #[serde(default)]
    pub executive: ExecutiveConfig,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            executive: ExecutiveConfig::default(),
        }
    }
}

/// On-disk formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

impl PipelineConfig {
    /// Parse configuration text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| VisPipeError::Serialization(format!("Invalid TOML: {}", e))),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| VisPipeError::Serialization(format!("Invalid JSON: {}", e))),
        }
    }

    /// Render configuration text in the given format
    pub fn render(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| VisPipeError::Serialization(format!("Failed to write TOML: {}", e))),
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| VisPipeError::Serialization(format!("Failed to write JSON: {}", e))),
        }
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VisPipeError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::parse(&content, ConfigFormat::from_path(path))
            .map_err(|e| e.with_context(format!("Failed to parse config file {:?}", path)))?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load a configuration file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk in the format its extension names
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    VisPipeError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = self.render(ConfigFormat::from_path(path))?;
        std::fs::write(path, content).map_err(|e| {
            VisPipeError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}
