//! Eventwire configuration management.
//!
//! Handles the configuration file at:
//! - Linux: ~/.config/eventwire/config.toml
//! - macOS: ~/Library/Application Support/eventwire/config.toml
//! - Windows: %APPDATA%\eventwire\config.toml
//!
//! A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EventwireError, Result};

/// Eventwire configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EventwireConfig {
    /// Code generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,

    /// Removal settings
    #[serde(default)]
    pub removal: RemovalConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Code shape used when a capability gets its first implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStyle {
    #[default]
    Anonymous,
    InnerClass,
    Interface,
}

/// Where a generated inner class goes in the designed class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InnerPosition {
    First,
    #[default]
    Last,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodegenConfig {
    #[serde(default)]
    pub style: ImplementationStyle,

    #[serde(default)]
    pub inner_position: InnerPosition,

    /// Name of generated inner classes; `${component_name}` and
    /// `${listener_className}` are expanded
    #[serde(default = "default_inner_name_template")]
    pub inner_name_template: String,

    /// Forward generated handlers to a stub method of the designed class
    #[serde(default)]
    pub create_stub: bool,

    /// Name of stub methods; `${component_name}`, `${event_name}` and
    /// `${listener_name}` are expanded
    #[serde(default = "default_stub_name_template")]
    pub stub_name_template: String,

    #[serde(default)]
    pub final_parameters: bool,

    #[serde(default = "default_true")]
    pub add_override: bool,
}

fn default_inner_name_template() -> String {
    "${component_name}${listener_className}".to_string()
}

fn default_stub_name_template() -> String {
    "do_${component_name}_${event_name}".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            style: ImplementationStyle::default(),
            inner_position: InnerPosition::default(),
            inner_name_template: default_inner_name_template(),
            create_stub: false,
            stub_name_template: default_stub_name_template(),
            final_parameters: false,
            add_override: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemovalConfig {
    /// Ask before deleting implementation code
    #[serde(default = "default_true")]
    pub confirm: bool,

    /// Delete stub methods that lose their last caller
    #[serde(default = "default_true")]
    pub delete_stub: bool,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            confirm: true,
            delete_stub: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl EventwireConfig {
    /// Default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("eventwire").join("config.toml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| EventwireError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| EventwireError::ConfigError {
            message: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| EventwireError::IoError {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| EventwireError::ConfigError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(|e| EventwireError::IoError {
            path: temp_path.clone(),
            message: e.to_string(),
        })?;
        fs::rename(&temp_path, path).map_err(|e| EventwireError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(EventwireError::ConfigError {
                message: format!(
                    "Invalid log level: {}. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        for (key, template) in [
            ("codegen.inner_name_template", &self.codegen.inner_name_template),
            ("codegen.stub_name_template", &self.codegen.stub_name_template),
        ] {
            if template.trim().is_empty() {
                return Err(EventwireError::ConfigError {
                    message: format!("{} must not be empty", key),
                });
            }
        }
        Ok(())
    }
}
