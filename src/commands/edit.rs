//! Editing command handlers
//!
//! Each handler opens the file, runs one designer operation and writes the
//! result back unless `--dry-run` is given, in which case the edited source
//! is printed instead.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::cli::{AddArgs, DeleteComponentArgs, EditOptions, RemoveArgs, StyleArg};
use crate::commands::{CommandContext, TerminalDecisions};
use crate::config::ImplementationStyle;
use crate::designer::EventsDesigner;
use crate::error::{EventwireError, Result};
use crate::mutator::{Outcome, Scripted};
use crate::scanner::MethodLocation;

#[derive(Debug, Serialize)]
struct EditReport {
    file: String,
    operation: String,
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<MethodLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl EditReport {
    fn render_text(&self) -> String {
        if let Some(source) = &self.source {
            return source.clone();
        }
        let mut out = format!("{}: {:?}", self.operation, self.outcome);
        if let Some(location) = &self.location {
            out.push_str(&format!(" (line {})", location.line));
        }
        out.push('\n');
        out
    }
}

/// Run the add command
pub fn run_add(args: &AddArgs, ctx: &CommandContext) -> Result<String> {
    let mut designer = ctx.open(&args.file)?;
    if let Some(style) = args.style {
        designer.config_mut().codegen.style = match style {
            StyleArg::Anonymous => ImplementationStyle::Anonymous,
            StyleArg::InnerClass => ImplementationStyle::InnerClass,
            StyleArg::Interface => ImplementationStyle::Interface,
        };
    }
    if args.stub {
        designer.config_mut().codegen.create_stub = true;
    }
    let before = designer.source().revision();
    let location = designer.ensure_method(&args.component, &args.listener, &args.method)?;
    let outcome = if designer.source().revision() == before {
        Outcome::Unchanged
    } else {
        Outcome::Applied
    };
    let operation = format!("add {}.{}.{}", args.component, args.listener, args.method);
    finish(ctx, &args.file, &args.edit, &designer, operation, outcome, Some(location))
}

/// Run the remove command
pub fn run_remove(args: &RemoveArgs, ctx: &CommandContext) -> Result<String> {
    let mut designer = ctx.open(&args.file)?;
    let mut decisions = TerminalDecisions::new(Scripted::new(args.yes, args.decision.map(Into::into)));
    let (operation, outcome) = match &args.method {
        Some(method) if !args.all => (
            format!("remove {}.{}.{}", args.component, args.listener, method),
            designer.remove_method(&args.component, &args.listener, method, &mut decisions)?,
        ),
        _ => (
            format!("remove {}.{}", args.component, args.listener),
            designer.remove_listener(&args.component, &args.listener, &mut decisions)?,
        ),
    };
    finish(ctx, &args.file, &args.edit, &designer, operation, outcome, None)
}

/// Run the delete-component command
pub fn run_delete_component(args: &DeleteComponentArgs, ctx: &CommandContext) -> Result<String> {
    let mut designer = ctx.open(&args.file)?;
    let outcome = designer.delete_component(&args.component)?;
    let operation = format!("delete {}", args.component);
    finish(ctx, &args.file, &args.edit, &designer, operation, outcome, None)
}

fn finish(
    ctx: &CommandContext,
    file: &Path,
    options: &EditOptions,
    designer: &EventsDesigner,
    operation: String,
    outcome: Outcome,
    location: Option<MethodLocation>,
) -> Result<String> {
    if outcome == Outcome::Applied && !options.dry_run {
        fs::write(file, designer.text()).map_err(|e| EventwireError::IoError {
            path: file.to_path_buf(),
            message: e.to_string(),
        })?;
        if ctx.verbose {
            eprintln!("Wrote {}", file.display());
        }
    }
    let report = EditReport {
        file: file.display().to_string(),
        operation,
        outcome,
        location,
        source: options.dry_run.then(|| designer.text().to_string()),
    };
    ctx.render(&report, EditReport::render_text)
}
