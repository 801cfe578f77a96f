//! List command handlers

use crate::cli::{ListArgs, MenuArgs};
use crate::commands::CommandContext;
use crate::error::{EventwireError, Result};

/// Run the list command
pub fn run_list(args: &ListArgs, ctx: &CommandContext) -> Result<String> {
    let designer = ctx.open(&args.file)?;
    let mut tree = designer.events()?;
    if let Some(name) = &args.component {
        tree.components.retain(|c| &c.name == name);
        if tree.components.is_empty() {
            return Err(EventwireError::UnknownComponent { name: name.clone() });
        }
    }
    if !args.all {
        for component in &mut tree.components {
            component.groups.retain(|g| g.is_modified);
        }
    }
    ctx.render(&tree, |t| t.render_text(args.all))
}

/// Run the menu command
pub fn run_menu(args: &MenuArgs, ctx: &CommandContext) -> Result<String> {
    let designer = ctx.open(&args.file)?;
    let menu = designer.menu(&args.component)?;
    ctx.render(&menu, |m| m.render_text())
}
