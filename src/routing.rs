//! Routing analysis for self-implemented listeners
//!
//! When the designed class implements a callback itself, one method body can
//! serve several components by dispatching on the event source:
//!
//! ```java
//! public void keyPressed(KeyEvent e) {
//!   if (e.getSource() == m_button) {
//!     do_m_button_keyPressed(e);
//!   }
//! }
//! ```
//!
//! Only top-level `if` statements without `else` comparing `getSource()` of the
//! event parameter against a known component count as guards. Anything else is
//! treated as plain handler code.

use serde::Serialize;

use crate::components::{Component, Reference};
use crate::java::ast::{
    walk_body, Expr, ExprKind, MethodDeclaration, Span, Statement, StatementKind, TypeDeclaration,
    WalkItem,
};
use crate::listener_methods::CallbackMethodSpec;
use crate::scanner::RegistrationSite;

/// How a self-implemented callback method serves one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// The method body handles the event for the component
    Handler,
    /// A guard forwards the event to a stub method
    RoutedToStub {
        target: String,
        stub: String,
        guard: Span,
    },
    /// The method exists but does not serve the component
    NotPresent,
}

/// A recognized `if (e.getSource() == target) ...` statement
#[derive(Debug, Clone)]
pub struct Guard<'a> {
    /// Component name the guard compares against
    pub target: String,
    pub statement: &'a Statement,
    /// Stub method the branch forwards to, when it is a single forwarding call
    pub stub: Option<String>,
}

impl Guard<'_> {
    pub fn span(&self) -> Span {
        self.statement.extended_span
    }
}

/// Routing decisions of one site, keyed by callback method key
#[derive(Debug, Clone, Default, Serialize)]
pub struct Routing {
    pub decisions: Vec<(String, RoutingDecision)>,
}

impl Routing {
    pub fn get(&self, method: &CallbackMethodSpec) -> Option<&RoutingDecision> {
        let key = method.key();
        self.decisions
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, decision)| decision)
    }
}

/// Classify every callback method of a self-implemented site for `component`.
pub fn classify(
    class: &TypeDeclaration,
    site: &RegistrationSite,
    methods: &[CallbackMethodSpec],
    components: &[Component],
    component: &Component,
) -> Routing {
    let decisions = methods
        .iter()
        .map(|spec| {
            let decision = match site.location(spec) {
                None => RoutingDecision::NotPresent,
                Some(_) => match class.find_method(&spec.name, spec.arity()) {
                    Some(method) => decide(class, method, components, component),
                    None => RoutingDecision::NotPresent,
                },
            };
            (spec.key(), decision)
        })
        .collect();
    Routing { decisions }
}

fn decide(
    class: &TypeDeclaration,
    method: &MethodDeclaration,
    components: &[Component],
    component: &Component,
) -> RoutingDecision {
    let guards = guards(class, method, components);
    if guards.is_empty() {
        return RoutingDecision::Handler;
    }
    let Some(guard) = guards.iter().find(|g| g.target == component.name) else {
        return RoutingDecision::NotPresent;
    };
    match &guard.stub {
        Some(stub) => RoutingDecision::RoutedToStub {
            target: component.name.clone(),
            stub: stub.clone(),
            guard: guard.span(),
        },
        None => {
            tracing::debug!(
                "{}: guard for {} is not a single forwarding call",
                method.name,
                component.name
            );
            RoutingDecision::Handler
        }
    }
}

/// Routing guards among the top-level statements of `method`
pub fn guards<'a>(
    class: &TypeDeclaration,
    method: &'a MethodDeclaration,
    components: &[Component],
) -> Vec<Guard<'a>> {
    let Some(event) = method.params.first().map(|p| p.name.as_str()) else {
        return Vec::new();
    };
    method
        .statements()
        .iter()
        .filter_map(|statement| {
            let StatementKind::If {
                condition,
                then_branch,
                else_branch: None,
            } = &statement.kind
            else {
                return None;
            };
            let target = guard_target(condition, event, components)?;
            let stub = forwarded_call(class, then_branch, event);
            Some(Guard {
                target,
                statement,
                stub,
            })
        })
        .collect()
}

/// Component named by `e.getSource() == E` (either operand order)
fn guard_target(condition: &Expr, event: &str, components: &[Component]) -> Option<String> {
    let ExprKind::Binary { op, left, right } = &condition.unparenthesized().kind else {
        return None;
    };
    if op != "==" {
        return None;
    }
    let other = if is_get_source(left, event) {
        right
    } else if is_get_source(right, event) {
        left
    } else {
        return None;
    };
    resolve_component(other, components)
}

fn is_get_source(expr: &Expr, event: &str) -> bool {
    match &expr.unparenthesized().kind {
        ExprKind::Call { target: Some(target), name, args } => {
            name == "getSource"
                && args.is_empty()
                && matches!(&target.unparenthesized().kind, ExprKind::Name(n) if n == event)
        }
        _ => false,
    }
}

/// `this`, or a field whose declaration creates a component. Fields assigned
/// in construction code, locals and other expressions are not resolved.
fn resolve_component(expr: &Expr, components: &[Component]) -> Option<String> {
    if expr.is_this() {
        return components.iter().find(|c| c.is_root()).map(|c| c.name.clone());
    }
    let name = expr.variable_name()?;
    components
        .iter()
        .find(|c| c.reference == Reference::Field { initialized: true } && c.name == name)
        .map(|c| c.name.clone())
}

/// Name of the method called when `branch` is exactly one call to a method of
/// the designed class that passes the event parameter along
pub fn forwarded_call(class: &TypeDeclaration, branch: &Statement, event: &str) -> Option<String> {
    let statements = branch.as_branch();
    let [statement] = statements.as_slice() else {
        return None;
    };
    let ExprKind::Call { target, name, args } = &statement.expression()?.unparenthesized().kind
    else {
        return None;
    };
    if target.as_deref().is_some_and(|t| !t.is_this()) {
        return None;
    }
    let [argument] = args.as_slice() else {
        return None;
    };
    if !matches!(&argument.unparenthesized().kind, ExprKind::Name(n) if n == event) {
        return None;
    }
    class.find_method(name, 1)?;
    Some(name.clone())
}

/// Spans of every unqualified or `this.` call to `name` with `arity`
/// arguments anywhere in the class, nested bodies included
pub fn call_sites(class: &TypeDeclaration, name: &str, arity: usize) -> Vec<Span> {
    let mut sites = Vec::new();
    walk_body(&class.body, &mut |item| {
        if let WalkItem::Expr(expr) = item {
            if let ExprKind::Call {
                target,
                name: called,
                args,
            } = &expr.kind
            {
                if called == name
                    && args.len() == arity
                    && target.as_deref().map_or(true, Expr::is_this)
                {
                    sites.push(expr.span);
                }
            }
        }
    });
    sites
}
