//! Error types and exit codes for eventwire

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Main error type for eventwire operations
///
/// Analysis-phase misses (unresolvable types, unrecognized routing shapes) never
/// show up here: they are absorbed where they happen. Only caller-input problems
/// and failed edits surface as errors.
#[derive(Error, Debug)]
pub enum EventwireError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse source: {message}")]
    ParseFailure { message: String },

    #[error("No designed class found in source")]
    NoDesignedClass,

    #[error("Unknown component: {name}")]
    UnknownComponent { name: String },

    #[error("Component {component} has no listener titled '{title}'")]
    UnknownListener { component: String, title: String },

    #[error("Listener '{listener}' has no method titled '{title}'")]
    UnknownMethod { listener: String, title: String },

    #[error("No construction code to host generated code in {class}")]
    NoConstructionCode { class: String },

    #[error("Edit failed: {message}")]
    EditFailure { message: String },

    #[error("Source changed since analysis (expected revision {expected:016x}, found {found:016x})")]
    StaleSnapshot { expected: u64, found: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error at {path}: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EventwireError {
    /// Convert error to the CLI exit code:
    /// - 1: File not found / IO error
    /// - 2: Parse failure
    /// - 3: Unknown component, listener or method
    /// - 4: Edit failure or stale snapshot
    /// - 5: Configuration error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::IoError { .. } | Self::Io(_) => ExitCode::from(1),
            Self::ParseFailure { .. } | Self::NoDesignedClass => ExitCode::from(2),
            Self::UnknownComponent { .. }
            | Self::UnknownListener { .. }
            | Self::UnknownMethod { .. } => ExitCode::from(3),
            Self::NoConstructionCode { .. }
            | Self::EditFailure { .. }
            | Self::StaleSnapshot { .. } => ExitCode::from(4),
            Self::ConfigError { .. } => ExitCode::from(5),
        }
    }

    pub(crate) fn edit(message: impl Into<String>) -> Self {
        Self::EditFailure {
            message: message.into(),
        }
    }
}

/// Result type alias for eventwire operations
pub type Result<T> = std::result::Result<T, EventwireError>;
