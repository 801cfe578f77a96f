//! Component deletion cascade
//!
//! Deleting a component takes its construction statements, its field, every
//! registration it owns and whatever implementation code only it used. It
//! never asks questions and never touches registrations of other components.

use crate::components::{construction_flow, constructor};
use crate::error::{EventwireError, Result};
use crate::java::ast::{Statement, StatementKind};
use crate::java::Transaction;
use crate::scanner::Implementation;

use super::remove::{remove_registration, remove_self_guards};
use super::{
    delete_unused_stubs, forwarded_stubs, mentions, remove_member, remove_type_if_unused,
    EditContext, Plan,
};

/// Delete a component and its listener wiring
pub fn delete_component(ctx: &EditContext<'_>, component: &str) -> Result<Plan> {
    let model = ctx.model.component(component)?;
    let target = &model.component;
    if target.is_root() {
        return Err(EventwireError::edit("the designed class itself cannot be deleted"));
    }
    let text = ctx.text();
    let mut tx = ctx.source.transaction();
    let mut stubs = Vec::new();
    let mut named_types = Vec::new();

    for flow in construction_flow(ctx.class) {
        let statement = flow.statement;
        if !target.scope.contains(statement.span) {
            continue;
        }
        if let Some(creation) = target.creation {
            if statement.span.start < creation.start {
                continue;
            }
        }
        if Some(statement.extended_span) == target.creation || mentions(statement, &target.name) {
            tx.remove_lines(text, statement.extended_span);
        }
    }

    if let Some(field_span) = target.field {
        let single = ctx
            .class
            .body
            .find_field(&target.name)
            .is_some_and(|(field, _)| field.declarators.len() == 1);
        if single {
            remove_member(&mut tx, text, field_span);
        } else {
            tracing::warn!(
                "{} shares its field declaration with other variables, keeping it",
                target.name
            );
        }
    }

    for (title, site) in &model.sites.sites {
        remove_registration(ctx, &mut tx, site);
        match &site.implementation {
            Implementation::Anonymous { body, .. } => stubs.extend(forwarded_stubs(ctx.class, body)),
            Implementation::Named { type_name, .. } => named_types.push(type_name.clone()),
            Implementation::SelfImpl => {
                if let Ok(entry) = model.entry(title) {
                    remove_self_guards(ctx, &mut tx, &mut stubs, model, entry, site);
                }
            }
        }
    }

    if let Some(body) = constructor(ctx.class).and_then(|c| c.body.as_ref()) {
        remove_emptied_blocks(&mut tx, text, &body.statements);
    }

    named_types.sort();
    named_types.dedup();
    for type_name in &named_types {
        remove_type_if_unused(ctx, &mut tx, type_name, &mut stubs);
    }
    delete_unused_stubs(ctx, &mut tx, &stubs);

    tracing::debug!("deleting {} takes {} edits", target.name, tx.len());
    Ok(Plan::from_removal(ctx, tx))
}

/// Remove nested blocks whose every statement is being removed.
/// Returns whether all of `statements` are removed.
fn remove_emptied_blocks(tx: &mut Transaction, text: &str, statements: &[Statement]) -> bool {
    let mut all_removed = !statements.is_empty();
    for statement in statements {
        let removed = match &statement.kind {
            StatementKind::Block(block) if !block.statements.is_empty() => {
                if tx.removes(statement.span) {
                    true
                } else if remove_emptied_blocks(tx, text, &block.statements) {
                    tx.remove_lines(text, statement.extended_span);
                    true
                } else {
                    false
                }
            }
            _ => tx.removes(statement.span),
        };
        all_removed &= removed;
    }
    all_removed
}
