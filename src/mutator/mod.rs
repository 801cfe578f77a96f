//! Source mutations of listener wiring
//!
//! Every operation plans a single [`Transaction`] against the snapshot it was
//! analyzed from. The caller commits it (all or nothing) and re-analyzes.
//!
//! - [`generate`]: `ensure_method`, creating the registration and its shape on demand
//! - [`remove`]: `remove_method` and `remove_capability`
//! - [`cascade`]: `delete_component`
//! - [`decision`]: questions asked of the caller along the way

pub mod cascade;
pub mod decision;
pub mod generate;
pub mod remove;

use std::collections::BTreeSet;

use regex::Regex;

use crate::config::EventwireConfig;
use crate::java::ast::{
    walk_body, walk_statements, ClassBody, ExprKind, MethodDeclaration, Span, Statement,
    TypeDeclaration, WalkItem,
};
use crate::java::syntax::{line_end_inclusive, line_start, whole_line_span};
use crate::java::{SourceUnit, Transaction};
use crate::model::Model;
use crate::routing::{call_sites, forwarded_call};
use crate::scanner::Implementation;
use crate::types::{ancestors, TypeDecl, TypeResolver};

pub use cascade::delete_component;
pub use decision::{DecisionProvider, MultiUseChoice, Recording, Scripted};
pub use generate::ensure_method;
pub use remove::{remove_capability, remove_method};

/// Everything an operation reads: one snapshot and its analysis
pub struct EditContext<'a> {
    pub resolver: &'a dyn TypeResolver,
    pub source: &'a SourceUnit,
    pub class: &'a TypeDeclaration,
    pub model: &'a Model,
    pub config: &'a EventwireConfig,
}

impl<'a> EditContext<'a> {
    pub fn text(&self) -> &'a str {
        self.source.text()
    }
}

/// What an operation wants done to the snapshot
#[derive(Debug)]
pub enum Plan {
    Edit(Transaction),
    /// Nothing to do; the source already has the requested shape
    Unchanged,
    /// The caller declined a decision; nothing may be edited
    Cancelled,
}

impl Plan {
    fn from_transaction(tx: Transaction) -> Self {
        if tx.is_empty() {
            Plan::Unchanged
        } else {
            Plan::Edit(tx)
        }
    }

    /// Plan of a removal, dropping the single-type imports it leaves unreferenced
    fn from_removal(ctx: &EditContext<'_>, mut tx: Transaction) -> Self {
        remove_unused_imports(ctx, &mut tx);
        Self::from_transaction(tx)
    }
}

/// Result of a committed operation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Unchanged,
    Cancelled,
}

/// Remove single-type imports that were referenced before the edits of `tx`
/// and are not referenced after them
pub(crate) fn remove_unused_imports(ctx: &EditContext<'_>, tx: &mut Transaction) {
    if tx.is_empty() {
        return;
    }
    let text = ctx.text();
    let Ok(after) = tx.clone().commit(text) else {
        return;
    };
    let (before, after) = (without_imports(text), without_imports(&after));
    for import in &ctx.source.ast().imports {
        if import.is_static || import.is_wildcard {
            continue;
        }
        let Some(name) = import.path.rsplit('.').next() else {
            continue;
        };
        let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
            continue;
        };
        if pattern.is_match(&before) && !pattern.is_match(&after) {
            tracing::debug!("import {} is no longer used", import.path);
            tx.remove_lines(text, import.span);
        }
    }
}

fn without_imports(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("import "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove a class member together with one blank separator line next to it
pub(crate) fn remove_member(tx: &mut Transaction, text: &str, span: Span) {
    let mut span = whole_line_span(text, span);
    if span.start == line_start(text, span.start) && span.start > 0 {
        let previous = line_start(text, span.start - 1);
        let following = line_end_inclusive(text, span.end);
        if text[previous..span.start].trim().is_empty() {
            span.start = previous;
        } else if span.end < text.len() && text[span.end..following].trim().is_empty() {
            span.end = following;
        }
    }
    tx.remove(span);
}

/// Remove every statement of a method body, keeping the braces
pub(crate) fn clear_body(tx: &mut Transaction, text: &str, method: &MethodDeclaration) {
    let statements = method.statements();
    if let (Some(first), Some(last)) = (statements.first(), statements.last()) {
        tx.remove_lines(text, Span::new(first.extended_span.start, last.span.end));
    }
}

/// Whether a method body holds nothing but whitespace
pub(crate) fn is_body_empty(text: &str, method: &MethodDeclaration) -> bool {
    match &method.body {
        Some(body) => text[body.span.start + 1..body.span.end - 1].trim().is_empty(),
        None => false,
    }
}

/// Stub a callback method forwards to: its body is a single call to a method
/// of the designed class passing the event parameter
pub(crate) fn forwarded_stub(class: &TypeDeclaration, method: &MethodDeclaration) -> Option<String> {
    let event = method.params.first()?.name.as_str();
    match method.statements() {
        [statement] => forwarded_call(class, statement, event),
        _ => None,
    }
}

/// Stubs forwarded to from any method of a body
pub(crate) fn forwarded_stubs(class: &TypeDeclaration, body: &ClassBody) -> Vec<String> {
    body.methods
        .iter()
        .filter_map(|m| forwarded_stub(class, m))
        .collect()
}

/// Delete stub methods whose every call site is already being removed
pub(crate) fn delete_unused_stubs(ctx: &EditContext<'_>, tx: &mut Transaction, stubs: &[String]) {
    if !ctx.config.removal.delete_stub {
        return;
    }
    let mut seen = BTreeSet::new();
    for stub in stubs {
        if !seen.insert(stub.as_str()) {
            continue;
        }
        let Some(method) = ctx.class.find_method(stub, 1) else {
            continue;
        };
        let calls = call_sites(ctx.class, stub, 1);
        if calls.iter().all(|call| tx.removes(*call)) {
            tracing::debug!("stub {} has no remaining callers", stub);
            remove_member(tx, ctx.text(), method.extended_span);
        } else {
            tracing::debug!("stub {} is still called elsewhere, keeping it", stub);
        }
    }
}

/// Creation expressions `new Name(...)` of a named type anywhere in the class
pub(crate) fn type_usages(class: &TypeDeclaration, type_name: &str) -> Vec<Span> {
    let mut usages = Vec::new();
    walk_body(&class.body, &mut |item| {
        if let WalkItem::Expr(expr) = item {
            if let ExprKind::New { ty, body: None, .. } = &expr.kind {
                if ty.simple_name() == Some(type_name) {
                    usages.push(expr.span);
                }
            }
        }
    });
    usages
}

/// Remove a named implementation type once all its creations are being removed
pub(crate) fn remove_type_if_unused(
    ctx: &EditContext<'_>,
    tx: &mut Transaction,
    type_name: &str,
    stubs: &mut Vec<String>,
) {
    let usages = type_usages(ctx.class, type_name);
    if !usages.iter().all(|usage| tx.removes(*usage)) {
        return;
    }
    let Some(decl) = ctx.source.ast().find_type(type_name) else {
        return;
    };
    tracing::debug!("{} is no longer used", type_name);
    stubs.extend(forwarded_stubs(ctx.class, &decl.body));
    remove_member(tx, ctx.text(), decl.extended_span);
}

/// Registration spans of every site implemented by the named type
pub(crate) fn registrations_of_type(model: &Model, type_name: &str) -> Vec<Span> {
    model
        .components
        .iter()
        .flat_map(|c| c.sites.sites.values())
        .filter(|site| {
            matches!(&site.implementation, Implementation::Named { type_name: t, .. } if t == type_name)
        })
        .flat_map(|site| site.removal_spans())
        .collect()
}

/// Whether a concrete body for `name/arity` is inherited from `decl`'s
/// superclasses (or `decl` itself when `include_self`)
pub(crate) fn provides_concrete(
    resolver: &dyn TypeResolver,
    decl: &TypeDecl,
    include_self: bool,
    name: &str,
    arity: usize,
) -> bool {
    let own = include_self.then_some(decl);
    own.into_iter()
        .chain(ancestors(resolver, decl))
        .filter(|d| d.is_class() && !d.is_object())
        .any(|d| {
            d.methods
                .iter()
                .any(|m| !m.is_abstract && m.name == name && m.params.len() == arity)
        })
}

/// Whether a statement refers to the variable `name` (or `this.name`)
pub(crate) fn mentions(statement: &Statement, name: &str) -> bool {
    let mut found = false;
    walk_statements(std::slice::from_ref(statement), &mut |item| {
        if let WalkItem::Expr(expr) = item {
            if expr.variable_name() == Some(name) {
                found = true;
            }
        }
    });
    found
}
