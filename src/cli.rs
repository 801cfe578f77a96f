//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::mutator::MultiUseChoice;

/// Inspect and edit event-listener wiring in Java UI source
#[derive(Parser, Debug)]
#[command(name = "eventwire")]
#[command(about = "Discover, add and remove listener implementations of UI components in Java source")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to <config dir>/eventwire/config.toml)
    #[arg(long, value_name = "FILE", global = true, env = "EVENTWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directories with additional Java declarations (repeatable)
    #[arg(long, value_name = "DIR", global = true)]
    pub classpath: Vec<PathBuf>,
}

// ============================================
// Main Commands Enum
// ============================================

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show components with their listener groups and methods
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show the add/open commands available for a component
    Menu(MenuArgs),

    /// Make sure a component handles a listener method, generating code when missing
    Add(AddArgs),

    /// Remove a listener method, or a whole listener with --all
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),

    /// Delete a component with all of its listener code
    DeleteComponent(DeleteComponentArgs),
}

// ============================================
// Subcommand Arguments
// ============================================

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Java source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only this component
    #[arg(long, short = 'c')]
    pub component: Option<String>,

    /// Include listener groups without registrations
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct MenuArgs {
    /// Java source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Component name (`this` for the designed class)
    #[arg(default_value = "this")]
    pub component: String,
}

/// Options shared by commands that edit the file
#[derive(Args, Debug, Clone)]
pub struct EditOptions {
    /// Print the edited source instead of writing it back
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Java source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Component name (`this` for the designed class)
    pub component: String,

    /// Listener group title, e.g. `key` or `mouseWheel`
    pub listener: String,

    /// Method title or name, e.g. `pressed` or `keyPressed`
    pub method: String,

    /// Override the configured implementation style
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,

    /// Forward the handler to a generated stub method
    #[arg(long)]
    pub stub: bool,

    #[command(flatten)]
    pub edit: EditOptions,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Java source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Component name (`this` for the designed class)
    pub component: String,

    /// Listener group title
    pub listener: String,

    /// Method title or name; omit with --all to remove the whole listener
    #[arg(required_unless_present = "all")]
    pub method: Option<String>,

    /// Remove the whole listener registration
    #[arg(long, conflicts_with = "method")]
    pub all: bool,

    /// Answer to the question asked when an implementation class is shared
    #[arg(long, value_enum)]
    pub decision: Option<DecisionArg>,

    /// Do not ask for confirmation before deleting code
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub edit: EditOptions,
}

#[derive(Args, Debug)]
pub struct DeleteComponentArgs {
    /// Java source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Component name
    pub component: String,

    #[command(flatten)]
    pub edit: EditOptions,
}

// ============================================
// Value Enums
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON - standard JSON output for machine parsing
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Anonymous,
    InnerClass,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecisionArg {
    Cancel,
    ThisUsage,
    AllUsages,
}

impl From<DecisionArg> for MultiUseChoice {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Cancel => MultiUseChoice::Cancel,
            DecisionArg::ThisUsage => MultiUseChoice::ThisUsageOnly,
            DecisionArg::AllUsages => MultiUseChoice::AllUsages,
        }
    }
}
