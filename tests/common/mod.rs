//! Common test utilities and fixtures for eventwire integration tests
//!
//! This module provides:
//! - `TestProject` for writing Java sources into a temporary class path
//! - Designer constructors with a chosen configuration
//! - Assertions over edited source text

#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use eventwire::{EventsDesigner, EventwireConfig, ImplementationStyle, TypeRegistry};
use tempfile::TempDir;

/// Temporary directory holding Java sources
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a source file with the given content
    pub fn add_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    pub fn read(&self, relative_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative_path)).expect("Failed to read file")
    }

    /// Toolkit plus every declaration in the project
    pub fn registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::with_toolkit().expect("toolkit parses");
        registry.load_dir(self.path()).expect("class path loads");
        registry
    }

    /// Run the eventwire binary inside the project
    pub fn run_cli(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_eventwire"))
            .current_dir(self.path())
            .env("EVENTWIRE_CONFIG", self.path().join("missing-config.toml"))
            .args(args)
            .output()
            .expect("Failed to run CLI")
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args);
        assert!(
            output.status.success(),
            "CLI command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }
}

pub fn designer(source: &str) -> EventsDesigner {
    EventsDesigner::with_toolkit(source).expect("source analyzes")
}

pub fn designer_with(source: &str, config: EventwireConfig) -> EventsDesigner {
    let registry = TypeRegistry::with_toolkit().expect("toolkit parses");
    EventsDesigner::new(source, registry, config).expect("source analyzes")
}

pub fn config_with_style(style: ImplementationStyle) -> EventwireConfig {
    let mut config = EventwireConfig::default();
    config.codegen.style = style;
    config
}

/// Assert that `needle` occurs exactly once in `text`
pub fn assert_once(text: &str, needle: &str) {
    let count = text.matches(needle).count();
    assert_eq!(
        count, 1,
        "Expected exactly one '{}' but found {}\nSource:\n{}",
        needle, count, text
    );
}

pub fn assert_absent(text: &str, needle: &str) {
    assert!(
        !text.contains(needle),
        "Expected no '{}'\nSource:\n{}",
        needle,
        text
    );
}

/// Assert that `first` appears before `second`
pub fn assert_before(text: &str, first: &str, second: &str) {
    let a = text.find(first).unwrap_or_else(|| panic!("missing '{}'\n{}", first, text));
    let b = text.find(second).unwrap_or_else(|| panic!("missing '{}'\n{}", second, text));
    assert!(a < b, "Expected '{}' before '{}'\nSource:\n{}", first, second, text);
}
