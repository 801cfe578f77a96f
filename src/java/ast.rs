//! Owned Java syntax model
//!
//! The tree-sitter tree borrows the source text, which makes it awkward to keep
//! around across analysis passes. This module holds a small, owned projection of
//! the parts of a compilation unit the listener model needs: declarations,
//! construction statements, and the expression shapes used by listener wiring.
//! Every node keeps its byte [`Span`] so edits can be computed against the text
//! it was parsed from.

use serde::Serialize;

use super::type_ref::TypeRef;

/// Half-open byte range into the parsed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    /// End offset of the package declaration, if any
    pub package_end: Option<usize>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDeclaration>,
}

impl CompilationUnit {
    /// Type declared anywhere in the unit, by simple or `Outer.Inner` name
    pub fn find_type(&self, name: &str) -> Option<&TypeDeclaration> {
        let simple = name.rsplit('.').next().unwrap_or(name);
        fn search<'a>(types: &'a [TypeDeclaration], simple: &str) -> Option<&'a TypeDeclaration> {
            types.iter().find_map(|t| {
                if t.name == simple {
                    Some(t)
                } else {
                    search(&t.body.types, simple)
                }
            })
        }
        search(&self.types, simple)
    }

    /// Whether an import already makes `qualified` visible by simple name
    pub fn imports_type(&self, qualified: &str) -> bool {
        let scope = qualified.rsplit_once('.').map(|(scope, _)| scope);
        self.imports.iter().filter(|i| !i.is_static).any(|i| {
            if i.is_wildcard {
                Some(i.path.as_str()) == scope
            } else {
                i.path == qualified
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_default: bool,
    pub annotations: Vec<String>,
    /// `@Deprecated` annotation or `@deprecated` doc tag
    pub deprecated: bool,
}

impl Modifiers {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| a == name || a.rsplit('.').next() == Some(name))
    }
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<TypeRef>,
}

#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeRef>,
    /// `implements` list for classes, `extends` list for interfaces
    pub interfaces: Vec<TypeRef>,
    pub span: Span,
    pub extended_span: Span,
    /// Offset right after the name / type parameters / superclass clause
    pub header_end: usize,
    /// Offset right after the last type of an existing `implements` list
    pub interfaces_end: Option<usize>,
    pub body: ClassBody,
    pub line: usize,
}

impl TypeDeclaration {
    pub fn is_interface(&self) -> bool {
        self.kind == DeclKind::Interface
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.body.methods.iter().filter(|m| m.is_constructor)
    }

    pub fn find_method(&self, name: &str, arity: usize) -> Option<&MethodDeclaration> {
        self.body.find_method(name, arity)
    }

    pub fn find_nested(&self, name: &str) -> Option<&TypeDeclaration> {
        self.body.types.iter().find(|t| t.name == name)
    }

    pub fn type_param_names(&self) -> Vec<String> {
        self.type_params.iter().map(|p| p.name.clone()).collect()
    }
}

/// Members of a class, interface, enum or anonymous class body
#[derive(Debug, Clone, Default)]
pub struct ClassBody {
    /// Span from `{` to `}` inclusive
    pub span: Span,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    pub types: Vec<TypeDeclaration>,
    /// Extended spans of all members in source order
    pub member_spans: Vec<Span>,
}

impl ClassBody {
    pub fn open_brace(&self) -> usize {
        self.span.start
    }

    pub fn close_brace(&self) -> usize {
        self.span.end.saturating_sub(1)
    }

    pub fn find_method(&self, name: &str, arity: usize) -> Option<&MethodDeclaration> {
        self.methods
            .iter()
            .find(|m| !m.is_constructor && m.name == name && m.params.len() == arity)
    }

    pub fn find_field(&self, name: &str) -> Option<(&FieldDeclaration, &VariableDeclarator)> {
        self.fields.iter().find_map(|f| {
            f.declarators
                .iter()
                .find(|d| d.name == name)
                .map(|d| (f, d))
        })
    }

    pub fn has_member_named(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
            || self.types.iter().any(|t| t.name == name)
            || self.find_field(name).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
    pub extended_span: Span,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub is_final: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub name: String,
    pub is_constructor: bool,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub return_type: TypeRef,
    pub params: Vec<Parameter>,
    pub body: Option<Block>,
    pub span: Span,
    pub extended_span: Span,
    /// 1-based line of the method name
    pub line: usize,
}

impl MethodDeclaration {
    pub fn is_abstract_in(&self, kind: DeclKind) -> bool {
        match kind {
            DeclKind::Interface => {
                self.body.is_none() && !self.modifiers.is_static && !self.modifiers.is_default
            }
            _ => self.modifiers.is_abstract || self.body.is_none(),
        }
    }

    pub fn statements(&self) -> &[Statement] {
        self.body.as_ref().map(|b| b.statements.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    /// Span from `{` to `}` inclusive
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    /// Span including attached leading comments
    pub extended_span: Span,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    LocalVariable {
        ty: TypeRef,
        declarators: Vec<VariableDeclarator>,
    },
    Expression(Expr),
    If {
        condition: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    Block(Block),
    Return(Option<Expr>),
    /// Any other statement; expressions found inside are kept for reference counting
    Other(Vec<Expr>),
}

impl Statement {
    /// Expression of an expression statement
    pub fn expression(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Expression(e) => Some(e),
            _ => None,
        }
    }

    /// Statements of a block, or the statement itself for the flat form
    pub fn as_branch(&self) -> Vec<&Statement> {
        match &self.kind {
            StatementKind::Block(block) => block.statements.iter().collect(),
            _ => vec![self],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    This,
    Null,
    Name(String),
    FieldAccess {
        target: Box<Expr>,
        name: String,
    },
    Call {
        target: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    New {
        ty: TypeRef,
        args: Vec<Expr>,
        body: Option<ClassBody>,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Parenthesized(Box<Expr>),
    Literal(String),
    /// Expressions the model does not distinguish; children kept for reference counting
    Other(Vec<Expr>),
}

impl Expr {
    /// Strip redundant parentheses
    pub fn unparenthesized(&self) -> &Expr {
        match &self.kind {
            ExprKind::Parenthesized(inner) => inner.unparenthesized(),
            _ => self,
        }
    }

    /// Simple name for `name` and `this.name`
    pub fn variable_name(&self) -> Option<&str> {
        match &self.unparenthesized().kind {
            ExprKind::Name(name) => Some(name),
            ExprKind::FieldAccess { target, name }
                if matches!(target.unparenthesized().kind, ExprKind::This) =>
            {
                Some(name)
            }
            _ => None,
        }
    }

    pub fn is_this(&self) -> bool {
        matches!(self.unparenthesized().kind, ExprKind::This)
    }
}

/// Depth-first walk over statements, descending into nested statements and
/// expressions (including anonymous class bodies).
pub fn walk_statements<F: FnMut(WalkItem<'_>)>(statements: &[Statement], visitor: &mut F) {
    for statement in statements {
        walk_statement(statement, visitor);
    }
}

/// Item handed to [`walk_statements`] visitors
#[derive(Debug, Clone, Copy)]
pub enum WalkItem<'a> {
    Statement(&'a Statement),
    Expr(&'a Expr),
}

fn walk_statement<F: FnMut(WalkItem<'_>)>(statement: &Statement, visitor: &mut F) {
    visitor(WalkItem::Statement(statement));
    match &statement.kind {
        StatementKind::LocalVariable { declarators, .. } => {
            for d in declarators {
                if let Some(init) = &d.init {
                    walk_expr(init, visitor);
                }
            }
        }
        StatementKind::Expression(e) => walk_expr(e, visitor),
        StatementKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            walk_expr(condition, visitor);
            walk_statement(then_branch, visitor);
            if let Some(else_branch) = else_branch {
                walk_statement(else_branch, visitor);
            }
        }
        StatementKind::Block(block) => walk_statements(&block.statements, visitor),
        StatementKind::Return(value) => {
            if let Some(value) = value {
                walk_expr(value, visitor);
            }
        }
        StatementKind::Other(exprs) => exprs.iter().for_each(|e| walk_expr(e, visitor)),
    }
}

pub fn walk_expr<F: FnMut(WalkItem<'_>)>(expr: &Expr, visitor: &mut F) {
    visitor(WalkItem::Expr(expr));
    match &expr.kind {
        ExprKind::FieldAccess { target, .. } => walk_expr(target, visitor),
        ExprKind::Call { target, args, .. } => {
            if let Some(target) = target {
                walk_expr(target, visitor);
            }
            args.iter().for_each(|a| walk_expr(a, visitor));
        }
        ExprKind::New { args, body, .. } => {
            args.iter().for_each(|a| walk_expr(a, visitor));
            if let Some(body) = body {
                walk_body(body, visitor);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, visitor);
            walk_expr(right, visitor);
        }
        ExprKind::Assign { target, value } => {
            walk_expr(target, visitor);
            walk_expr(value, visitor);
        }
        ExprKind::Parenthesized(inner) => walk_expr(inner, visitor),
        ExprKind::Other(children) => children.iter().for_each(|c| walk_expr(c, visitor)),
        ExprKind::This | ExprKind::Null | ExprKind::Name(_) | ExprKind::Literal(_) => {}
    }
}

/// Walk every method body, field initializer and nested type of a class body
pub fn walk_body<F: FnMut(WalkItem<'_>)>(body: &ClassBody, visitor: &mut F) {
    for field in &body.fields {
        for d in &field.declarators {
            if let Some(init) = &d.init {
                walk_expr(init, visitor);
            }
        }
    }
    for method in &body.methods {
        walk_statements(method.statements(), visitor);
    }
    for nested in &body.types {
        walk_body(&nested.body, visitor);
    }
}
