//! Command modules for the eventwire CLI
//!
//! ## Architecture
//!
//! - `list` - Events tree and component menus (read-only)
//! - `edit` - Add and remove listener code, delete components
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format, verbosity, configuration
//! and class path.

pub mod edit;
pub mod list;
pub mod prompt;

pub use edit::{run_add, run_delete_component, run_remove};
pub use list::{run_list, run_menu};
pub use prompt::TerminalDecisions;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::EventwireConfig;
use crate::designer::EventsDesigner;
use crate::error::{EventwireError, Result};
use crate::types::TypeRegistry;

/// Shared context passed to all command handlers
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Output format (text or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
    pub config: EventwireConfig,
    /// Directories with project declarations
    pub classpath: Vec<PathBuf>,
}

impl CommandContext {
    pub fn new(format: OutputFormat, verbose: bool, config: EventwireConfig, classpath: Vec<PathBuf>) -> Self {
        Self {
            format,
            verbose,
            config,
            classpath,
        }
    }

    /// Toolkit declarations plus everything found on the class path
    pub fn registry(&self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::with_toolkit()?;
        for dir in &self.classpath {
            let added = registry.load_dir(dir)?;
            if self.verbose {
                eprintln!("Loaded {} declarations from {}", added, dir.display());
            }
        }
        Ok(registry)
    }

    /// Open a designer over `file`
    pub fn open(&self, file: &Path) -> Result<EventsDesigner> {
        if !file.exists() {
            return Err(EventwireError::FileNotFound {
                path: file.display().to_string(),
            });
        }
        let text = fs::read_to_string(file).map_err(|e| EventwireError::IoError {
            path: file.to_path_buf(),
            message: e.to_string(),
        })?;
        if self.verbose {
            eprintln!("Read {} bytes from {}", text.len(), file.display());
        }
        EventsDesigner::new(text, self.registry()?, self.config.clone())
    }

    /// Render `value` as JSON, or with `text` for the text format
    pub fn render<T, F>(&self, value: &T, text: F) -> Result<String>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            OutputFormat::Text => Ok(text(value)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(value).map_err(|e| EventwireError::EditFailure {
                    message: format!("JSON serialization failed: {}", e),
                })?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}
