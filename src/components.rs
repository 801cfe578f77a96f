//! Component discovery
//!
//! The designed class is the root component, referenced as `this`. Every other
//! component is an object created with `new T(...)` in construction code and
//! kept in a local variable or a field, where `T` exposes at least one listener
//! capability.
//!
//! Construction code is the field initializers plus the first constructor, its
//! nested blocks flattened in source order. Bodies of anonymous classes and of
//! other methods are not construction code.

use serde::Serialize;

use crate::catalog::{build_catalog, Catalog};
use crate::java::ast::{
    CompilationUnit, DeclKind, Expr, ExprKind, MethodDeclaration, Span, Statement, StatementKind,
    TypeDeclaration,
};
use crate::java::TypeRef;
use crate::types::{TypeEnv, TypeResolver};

pub const ROOT: &str = "this";

/// How construction code refers to a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reference {
    This,
    Local,
    Field { initialized: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub name: String,
    pub reference: Reference,
    /// Instantiated type
    pub ty: TypeRef,
    /// Statement creating the component (local declaration or assignment)
    pub creation: Option<Span>,
    /// Field declaration holding the component
    pub field: Option<Span>,
    /// Block whose statements can see the component
    pub scope: Span,
    pub line: usize,
    pub catalog: Catalog,
}

impl Component {
    pub fn is_root(&self) -> bool {
        self.reference == Reference::This
    }

    /// Whether `expr` refers to this component
    pub fn is_referenced_by(&self, expr: &Expr) -> bool {
        match self.reference {
            Reference::This => expr.is_this(),
            Reference::Local => {
                matches!(&expr.unparenthesized().kind, ExprKind::Name(name) if *name == self.name)
            }
            Reference::Field { .. } => expr.variable_name() == Some(self.name.as_str()),
        }
    }

    /// Whether member methods of the designed class can name the component
    pub fn is_member_visible(&self) -> bool {
        !matches!(self.reference, Reference::Local)
    }

    /// Receiver prefix for registration calls: empty for the root
    pub fn receiver(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}.", self.name)
        }
    }
}

/// First top-level class with a constructor, else the first class
pub fn designed_class(unit: &CompilationUnit) -> Option<&TypeDeclaration> {
    let classes = || unit.types.iter().filter(|t| t.kind == DeclKind::Class);
    classes()
        .find(|t| t.constructors().next().is_some())
        .or_else(|| classes().next())
}

pub fn constructor(class: &TypeDeclaration) -> Option<&MethodDeclaration> {
    class.constructors().find(|c| c.body.is_some())
}

/// A construction statement with the block it appears in
#[derive(Debug, Clone, Copy)]
pub struct FlowStatement<'a> {
    pub statement: &'a Statement,
    pub block: Span,
}

/// Constructor statements in execution order, nested blocks flattened.
/// Block statements themselves are not returned, only their contents.
pub fn construction_flow(class: &TypeDeclaration) -> Vec<FlowStatement<'_>> {
    let mut flow = Vec::new();
    if let Some(body) = constructor(class).and_then(|c| c.body.as_ref()) {
        flatten(&body.statements, body.span, &mut flow);
    }
    flow
}

fn flatten<'a>(statements: &'a [Statement], block: Span, out: &mut Vec<FlowStatement<'a>>) {
    for statement in statements {
        match &statement.kind {
            StatementKind::Block(inner) => flatten(&inner.statements, inner.span, out),
            _ => out.push(FlowStatement { statement, block }),
        }
    }
}

/// Discover the components of the designed class, root first
pub fn discover<R: TypeResolver + ?Sized>(resolver: &R, class: &TypeDeclaration) -> Vec<Component> {
    let outer = TypeEnv::open(&class.type_params);
    let root_type = TypeRef::generic(
        class.name.clone(),
        class.type_params.iter().map(|p| TypeRef::named(&p.name)).collect(),
    );
    let mut components = vec![Component {
        name: ROOT.to_string(),
        reference: Reference::This,
        catalog: build_catalog(resolver, &root_type, &outer),
        ty: root_type,
        creation: None,
        field: None,
        scope: class.body.span,
        line: class.line,
    }];
    let mut candidates: Vec<Component> = Vec::new();

    for field in &class.body.fields {
        if field.modifiers.is_static {
            continue;
        }
        for declarator in &field.declarators {
            let Some(ty) = declarator.init.as_ref().and_then(|e| created_type(e, &field.ty)) else {
                continue;
            };
            candidates.push(Component {
                name: declarator.name.clone(),
                reference: Reference::Field { initialized: true },
                ty,
                creation: None,
                field: Some(field.extended_span),
                scope: class.body.span,
                line: field.line,
                catalog: Catalog::default(),
            });
        }
    }

    for flow in construction_flow(class) {
        let statement = flow.statement;
        match &statement.kind {
            StatementKind::LocalVariable { ty, declarators } => {
                for declarator in declarators {
                    let Some(created) = declarator.init.as_ref().and_then(|e| created_type(e, ty)) else {
                        continue;
                    };
                    candidates.push(Component {
                        name: declarator.name.clone(),
                        reference: Reference::Local,
                        ty: created,
                        creation: Some(statement.extended_span),
                        field: None,
                        scope: flow.block,
                        line: statement.line,
                        catalog: Catalog::default(),
                    });
                }
            }
            StatementKind::Expression(expr) => {
                let ExprKind::Assign { target, value } = &expr.unparenthesized().kind else {
                    continue;
                };
                let Some(name) = target.variable_name() else {
                    continue;
                };
                let Some((field, _)) = class.body.find_field(name) else {
                    continue;
                };
                let Some(created) = created_type(value, &field.ty) else {
                    continue;
                };
                if candidates.iter().any(|c| c.name == name) {
                    continue;
                }
                candidates.push(Component {
                    name: name.to_string(),
                    reference: Reference::Field { initialized: false },
                    ty: created,
                    creation: Some(statement.extended_span),
                    field: Some(field.extended_span),
                    scope: class.body.span,
                    line: statement.line,
                    catalog: Catalog::default(),
                });
            }
            _ => {}
        }
    }

    for mut candidate in candidates {
        candidate.catalog = build_catalog(resolver, &candidate.ty, &outer);
        if candidate.catalog.is_empty() {
            tracing::debug!(
                "{} ({}) exposes no listener capabilities",
                candidate.name,
                candidate.ty.display()
            );
            continue;
        }
        components.push(candidate);
    }
    components
}

/// Type created by `new T(...)` without a class body. A diamond or raw
/// creation takes the arguments of the declared type when it names the same class.
fn created_type(expr: &Expr, declared: &TypeRef) -> Option<TypeRef> {
    match &expr.unparenthesized().kind {
        ExprKind::New { ty, body: None, .. } => {
            if ty.args().is_empty()
                && !declared.args().is_empty()
                && ty.simple_name() == declared.simple_name()
            {
                Some(declared.clone())
            } else {
                Some(ty.clone())
            }
        }
        _ => None,
    }
}
