//! Registration scanner
//!
//! Binds existing registration calls in construction code to the capabilities
//! of a component and classifies the code shape behind each one.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::CapabilityEntry;
use crate::components::{construction_flow, Component};
use crate::java::ast::{
    ClassBody, CompilationUnit, Expr, ExprKind, MethodDeclaration, Span, StatementKind,
    TypeDeclaration,
};
use crate::java::TypeRef;
use crate::listener_methods::CallbackMethodSpec;
use crate::types::{is_subtype, TypeResolver};

/// Code shape implementing a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    AnonymousImpl,
    NamedInnerImpl,
    SelfImpl,
}

#[derive(Debug, Clone)]
pub enum Implementation {
    /// `new T() { ... }` written inline or in a local variable
    Anonymous {
        base: TypeRef,
        creation: Span,
        body: ClassBody,
    },
    /// `new T()` where `T` is declared in the edited unit
    Named { type_name: String, creation: Span },
    /// `this`; the designed class implements the callback
    SelfImpl,
}

/// Where an implemented callback method lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodLocation {
    /// Method span including attached comments
    pub span: Span,
    /// 1-based line of the method name
    pub line: usize,
}

impl MethodLocation {
    pub fn of(method: &MethodDeclaration) -> Self {
        Self {
            span: method.extended_span,
            line: method.line,
        }
    }
}

/// One existing registration of a capability
#[derive(Debug, Clone)]
pub struct RegistrationSite {
    pub capability: String,
    pub shape: Shape,
    /// Registration statement, attached comments included
    pub statement: Span,
    pub line: usize,
    /// Local variable declaration holding the implementation, for the
    /// one-level indirection form
    pub variable: Option<Span>,
    pub implementation: Implementation,
    /// Callback method key -> location, in callback method order
    pub methods: Vec<(String, Option<MethodLocation>)>,
}

impl RegistrationSite {
    pub fn location(&self, method: &CallbackMethodSpec) -> Option<MethodLocation> {
        self.methods
            .iter()
            .find(|(key, _)| *key == method.key())
            .and_then(|(_, location)| *location)
    }

    pub fn implemented_count(&self) -> usize {
        self.methods.iter().filter(|(_, l)| l.is_some()).count()
    }

    /// Spans removed when the registration goes away entirely
    pub fn removal_spans(&self) -> Vec<Span> {
        let mut spans = vec![self.statement];
        spans.extend(self.variable);
        spans
    }
}

/// Existing registrations of one component, keyed by capability title
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub sites: HashMap<String, RegistrationSite>,
}

impl ScanResult {
    pub fn site(&self, title: &str) -> Option<&RegistrationSite> {
        self.sites.get(title)
    }
}

/// Scan construction code for registrations of `component`.
pub fn scan<R: TypeResolver + ?Sized>(
    resolver: &R,
    unit: &CompilationUnit,
    class: &TypeDeclaration,
    component: &Component,
) -> ScanResult {
    let mut result = ScanResult::default();
    // local variable -> (initializer, declaration statement)
    let mut locals: HashMap<&str, (&Expr, Span)> = HashMap::new();

    for flow in construction_flow(class) {
        let statement = flow.statement;
        if let StatementKind::LocalVariable { declarators, .. } = &statement.kind {
            for declarator in declarators {
                if let Some(init) = &declarator.init {
                    locals.insert(declarator.name.as_str(), (init, statement.extended_span));
                }
            }
            continue;
        }
        if !component.scope.contains(statement.span) {
            continue;
        }
        if let Some(creation) = component.creation {
            if statement.span.start < creation.start {
                continue;
            }
        }
        let Some(expr) = statement.expression() else {
            continue;
        };
        let ExprKind::Call { target, name, args } = &expr.unparenthesized().kind else {
            continue;
        };
        if args.len() != 1 || !receiver_matches(component, target.as_deref()) {
            continue;
        }
        let entries: Vec<&CapabilityEntry> = component.catalog.by_registration(name).collect();
        if entries.is_empty() {
            continue;
        }

        let argument = args[0].unparenthesized();
        let (implementation, variable) = match &argument.kind {
            ExprKind::Name(local) => match locals.get(local.as_str()) {
                Some((init, declaration)) => match classify(unit, init) {
                    Some(implementation) => (implementation, Some(*declaration)),
                    None => continue,
                },
                None => continue,
            },
            _ => match classify(unit, argument) {
                Some(implementation) => (implementation, None),
                None => continue,
            },
        };

        let Some(entry) = select_entry(resolver, unit, class, &entries, &implementation) else {
            tracing::debug!("no capability of {} accepts argument of {}", component.name, name);
            continue;
        };
        if result.sites.contains_key(&entry.title) {
            tracing::debug!("{} registered twice on {}, keeping the first", entry.title, component.name);
            continue;
        }
        let methods = implemented_methods(unit, class, entry, &implementation);
        let shape = match implementation {
            Implementation::Anonymous { .. } => Shape::AnonymousImpl,
            Implementation::Named { .. } => Shape::NamedInnerImpl,
            Implementation::SelfImpl => Shape::SelfImpl,
        };
        tracing::debug!("{}: {} registered as {:?}", component.name, entry.title, shape);
        result.sites.insert(
            entry.title.clone(),
            RegistrationSite {
                capability: entry.title.clone(),
                shape,
                statement: statement.extended_span,
                line: statement.line,
                variable,
                implementation,
                methods,
            },
        );
    }
    result
}

fn receiver_matches(component: &Component, target: Option<&Expr>) -> bool {
    match target {
        None => component.is_root(),
        Some(target) => component.is_referenced_by(target),
    }
}

fn classify(unit: &CompilationUnit, expr: &Expr) -> Option<Implementation> {
    match &expr.unparenthesized().kind {
        ExprKind::This => Some(Implementation::SelfImpl),
        ExprKind::New {
            ty, body: Some(body), ..
        } => Some(Implementation::Anonymous {
            base: ty.clone(),
            creation: expr.span,
            body: body.clone(),
        }),
        ExprKind::New { ty, body: None, .. } => {
            let name = ty.name()?;
            let decl = unit.find_type(name)?;
            Some(Implementation::Named {
                type_name: decl.name.clone(),
                creation: expr.span,
            })
        }
        _ => None,
    }
}

/// Among overloads sharing a registration name, the one whose callback type
/// the implementation satisfies
fn select_entry<'c, R: TypeResolver + ?Sized>(
    resolver: &R,
    unit: &CompilationUnit,
    class: &TypeDeclaration,
    entries: &[&'c CapabilityEntry],
    implementation: &Implementation,
) -> Option<&'c CapabilityEntry> {
    if entries.len() == 1 {
        return entries.first().copied();
    }
    let implementing = match implementation {
        Implementation::Anonymous { base, .. } => resolver.resolve_ref(base),
        Implementation::Named { type_name, .. } => unit
            .find_type(type_name)
            .and_then(|_| resolver.resolve(type_name)),
        Implementation::SelfImpl => resolver.resolve(&class.name),
    }?;
    entries.iter().copied().find(|entry| {
        resolver
            .resolve(&entry.callback_decl)
            .is_some_and(|callback| is_subtype(resolver, implementing, callback))
    })
}

fn implemented_methods(
    unit: &CompilationUnit,
    class: &TypeDeclaration,
    entry: &CapabilityEntry,
    implementation: &Implementation,
) -> Vec<(String, Option<MethodLocation>)> {
    let body = match implementation {
        Implementation::Anonymous { body, .. } => Some(body),
        Implementation::Named { type_name, .. } => unit.find_type(type_name).map(|t| &t.body),
        Implementation::SelfImpl => Some(&class.body),
    };
    entry
        .methods
        .iter()
        .map(|method| {
            let location = body
                .and_then(|b| b.find_method(&method.name, method.arity()))
                .map(MethodLocation::of);
            (method.key(), location)
        })
        .collect()
}
