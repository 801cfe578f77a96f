//! tree-sitter-java front end: builds the owned [`CompilationUnit`] model

use tree_sitter::{Node, Parser, Tree};

use super::ast::*;
use super::syntax::{first_on_line, node_text, span_of};
use super::type_ref::TypeRef;
use crate::error::{EventwireError, Result};

/// Parse Java source into a tree-sitter tree
pub fn parse_tree(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| EventwireError::ParseFailure {
            message: format!("Failed to set language: {}", e),
        })?;
    parser
        .parse(source, None)
        .ok_or_else(|| EventwireError::ParseFailure {
            message: "Parser returned no tree".to_string(),
        })
}

/// Parse Java source into the owned model
pub fn parse_unit(source: &str) -> Result<CompilationUnit> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();
    if root.has_error() {
        tracing::debug!("source contains syntax errors, building a partial model");
    }
    Ok(Builder { source }.unit(&root))
}

struct Builder<'s> {
    source: &'s str,
}

impl<'s> Builder<'s> {
    fn text(&self, node: &Node) -> String {
        node_text(node, self.source)
    }

    fn line(&self, node: &Node) -> usize {
        node.start_position().row + 1
    }

    fn unit(&self, root: &Node) -> CompilationUnit {
        let mut unit = CompilationUnit::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    let mut inner = child.walk();
                    unit.package = child
                        .named_children(&mut inner)
                        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
                        .map(|n| self.text(&n));
                    unit.package_end = Some(child.end_byte());
                }
                "import_declaration" => unit.imports.push(self.import(&child)),
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    unit.types.push(self.type_declaration(&child));
                }
                _ => {}
            }
        }
        unit
    }

    fn import(&self, node: &Node) -> Import {
        let mut cursor = node.walk();
        let mut import = Import {
            path: String::new(),
            is_static: false,
            is_wildcard: false,
            span: span_of(node),
        };
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => import.is_static = true,
                "asterisk" => import.is_wildcard = true,
                "scoped_identifier" | "identifier" => import.path = self.text(&child),
                _ => {}
            }
        }
        import
    }

    fn type_declaration(&self, node: &Node) -> TypeDeclaration {
        let kind = match node.kind() {
            "interface_declaration" => DeclKind::Interface,
            "enum_declaration" => DeclKind::Enum,
            _ => DeclKind::Class,
        };
        let name_node = node.child_by_field_name("name");
        let name = name_node.map(|n| self.text(&n)).unwrap_or_default();
        let mut header_end = name_node.map(|n| n.end_byte()).unwrap_or(node.start_byte());

        let type_params = match node.child_by_field_name("type_parameters") {
            Some(params) => {
                header_end = params.end_byte();
                self.type_params(&params)
            }
            None => Vec::new(),
        };

        let mut superclass = None;
        let mut interfaces = Vec::new();
        let mut interfaces_end = None;
        let mut modifiers = Modifiers::default();
        let mut body = ClassBody::default();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "modifiers" => modifiers = self.modifiers(&child),
                "superclass" => {
                    header_end = child.end_byte();
                    let mut inner = child.walk();
                    superclass = child
                        .named_children(&mut inner)
                        .find(|n| !n.is_extra())
                        .map(|n| self.type_ref(&n));
                }
                "super_interfaces" | "extends_interfaces" => {
                    let mut inner = child.walk();
                    for list in child.named_children(&mut inner) {
                        if list.kind() == "type_list" {
                            let mut types = list.walk();
                            for ty in list.named_children(&mut types) {
                                if ty.is_extra() {
                                    continue;
                                }
                                interfaces.push(self.type_ref(&ty));
                                interfaces_end = Some(ty.end_byte());
                            }
                        }
                    }
                    if kind == DeclKind::Interface {
                        header_end = child.end_byte();
                    }
                }
                "class_body" | "interface_body" | "enum_body" => body = self.class_body(&child),
                _ => {}
            }
        }
        modifiers.deprecated |= self.has_deprecated_doc(node);

        TypeDeclaration {
            name,
            kind,
            modifiers,
            type_params,
            superclass,
            interfaces,
            span: span_of(node),
            extended_span: self.extended_span(node),
            header_end,
            interfaces_end,
            body,
            line: self.line(node),
        }
    }

    fn class_body(&self, node: &Node) -> ClassBody {
        let mut body = ClassBody {
            span: span_of(node),
            ..ClassBody::default()
        };
        self.collect_members(node, &mut body);
        body
    }

    fn collect_members(&self, node: &Node, body: &mut ClassBody) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    body.member_spans.push(self.extended_span(&child));
                    body.fields.push(self.field(&child));
                }
                "method_declaration" | "constructor_declaration" => {
                    body.member_spans.push(self.extended_span(&child));
                    body.methods.push(self.method(&child));
                }
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    body.member_spans.push(self.extended_span(&child));
                    body.types.push(self.type_declaration(&child));
                }
                // enum constants precede the member declarations
                "enum_body_declarations" => self.collect_members(&child, body),
                "block" | "static_initializer" | "enum_constant" => {
                    body.member_spans.push(self.extended_span(&child));
                }
                _ => {}
            }
        }
    }

    fn field(&self, node: &Node) -> FieldDeclaration {
        let mut modifiers = Modifiers::default();
        let mut declarators = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "modifiers" => modifiers = self.modifiers(&child),
                "variable_declarator" => declarators.push(self.declarator(&child)),
                _ => {}
            }
        }
        let ty = node
            .child_by_field_name("type")
            .map(|t| self.type_ref(&t))
            .unwrap_or_else(TypeRef::object);
        FieldDeclaration {
            ty,
            modifiers,
            declarators,
            span: span_of(node),
            extended_span: self.extended_span(node),
            line: self.line(node),
        }
    }

    fn declarator(&self, node: &Node) -> VariableDeclarator {
        VariableDeclarator {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(&n))
                .unwrap_or_default(),
            init: node.child_by_field_name("value").map(|v| self.expr(&v)),
            span: span_of(node),
        }
    }

    fn method(&self, node: &Node) -> MethodDeclaration {
        let is_constructor = node.kind() == "constructor_declaration";
        let name_node = node.child_by_field_name("name");
        let mut modifiers = Modifiers::default();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "modifiers" {
                modifiers = self.modifiers(&child);
            }
        }
        modifiers.deprecated |= self.has_deprecated_doc(node);

        let return_type = if is_constructor {
            TypeRef::Void
        } else {
            node.child_by_field_name("type")
                .map(|t| self.type_ref(&t))
                .unwrap_or(TypeRef::Void)
        };
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(&p))
            .unwrap_or_default();
        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|p| self.type_params(&p))
            .unwrap_or_default();
        let body = node.child_by_field_name("body").map(|b| self.block(&b));

        MethodDeclaration {
            name: name_node.map(|n| self.text(&n)).unwrap_or_default(),
            is_constructor,
            modifiers,
            type_params,
            return_type,
            params,
            body,
            span: span_of(node),
            extended_span: self.extended_span(node),
            line: name_node
                .map(|n| self.line(&n))
                .unwrap_or_else(|| self.line(node)),
        }
    }

    fn parameters(&self, node: &Node) -> Vec<Parameter> {
        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "formal_parameter" => {
                    let is_final = self.child_modifiers(&child).is_final;
                    params.push(Parameter {
                        name: child
                            .child_by_field_name("name")
                            .map(|n| self.text(&n))
                            .unwrap_or_default(),
                        ty: child
                            .child_by_field_name("type")
                            .map(|t| self.type_ref(&t))
                            .unwrap_or_else(TypeRef::object),
                        is_final,
                    });
                }
                "spread_parameter" => {
                    let mut inner = child.walk();
                    let mut ty = TypeRef::object();
                    let mut name = String::new();
                    for part in child.named_children(&mut inner) {
                        match part.kind() {
                            "variable_declarator" => {
                                name = part
                                    .child_by_field_name("name")
                                    .map(|n| self.text(&n))
                                    .unwrap_or_default();
                            }
                            "modifiers" => {}
                            _ => ty = self.type_ref(&part),
                        }
                    }
                    params.push(Parameter {
                        name,
                        ty: TypeRef::Array {
                            element: Box::new(ty),
                        },
                        is_final: false,
                    });
                }
                _ => {}
            }
        }
        params
    }

    fn type_params(&self, node: &Node) -> Vec<TypeParam> {
        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "type_parameter" {
                continue;
            }
            let mut name = String::new();
            let mut bound = None;
            let mut inner = child.walk();
            for part in child.named_children(&mut inner) {
                match part.kind() {
                    "type_identifier" | "identifier" => name = self.text(&part),
                    "type_bound" => {
                        let mut bounds = part.walk();
                        bound = part
                            .named_children(&mut bounds)
                            .find(|n| !n.is_extra())
                            .map(|n| self.type_ref(&n));
                    }
                    _ => {}
                }
            }
            params.push(TypeParam { name, bound });
        }
        params
    }

    fn child_modifiers(&self, node: &Node) -> Modifiers {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "modifiers");
        found.map(|m| self.modifiers(&m)).unwrap_or_default()
    }

    fn modifiers(&self, node: &Node) -> Modifiers {
        let mut modifiers = Modifiers::default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "public" => modifiers.is_public = true,
                "protected" => modifiers.is_protected = true,
                "private" => modifiers.is_private = true,
                "static" => modifiers.is_static = true,
                "abstract" => modifiers.is_abstract = true,
                "final" => modifiers.is_final = true,
                "default" => modifiers.is_default = true,
                "marker_annotation" | "annotation" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        let name = self.text(&name);
                        if name == "Deprecated" || name == "java.lang.Deprecated" {
                            modifiers.deprecated = true;
                        }
                        modifiers.annotations.push(name);
                    }
                }
                _ => {}
            }
        }
        modifiers
    }

    fn has_deprecated_doc(&self, node: &Node) -> bool {
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            match sibling.kind() {
                "block_comment" => {
                    let text = self.text(&sibling);
                    if text.starts_with("/**") {
                        return text.contains("@deprecated");
                    }
                }
                "line_comment" => {}
                _ => return false,
            }
            prev = sibling.prev_sibling();
        }
        false
    }

    /// Node span extended backwards over comments attached to it: comments that
    /// start their own line and are not separated from the node by a blank line.
    fn extended_span(&self, node: &Node) -> Span {
        let mut start = node.start_byte();
        let mut start_row = node.start_position().row;
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            if !matches!(sibling.kind(), "line_comment" | "block_comment") {
                break;
            }
            let adjacent = sibling.end_position().row + 1 >= start_row;
            if !adjacent || !first_on_line(self.source, sibling.start_byte()) {
                break;
            }
            start = sibling.start_byte();
            start_row = sibling.start_position().row;
            prev = sibling.prev_sibling();
        }
        Span::new(start, node.end_byte())
    }

    fn block(&self, node: &Node) -> Block {
        let mut statements = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.is_extra() {
                continue;
            }
            statements.push(self.statement(&child));
        }
        Block {
            span: span_of(node),
            statements,
        }
    }

    fn statement(&self, node: &Node) -> Statement {
        let kind = match node.kind() {
            "local_variable_declaration" => {
                let mut declarators = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "variable_declarator" {
                        declarators.push(self.declarator(&child));
                    }
                }
                StatementKind::LocalVariable {
                    ty: node
                        .child_by_field_name("type")
                        .map(|t| self.type_ref(&t))
                        .unwrap_or_else(TypeRef::object),
                    declarators,
                }
            }
            "expression_statement" => {
                let mut cursor = node.walk();
                let expr = node
                    .named_children(&mut cursor)
                    .find(|c| !c.is_extra())
                    .map(|e| self.expr(&e));
                match expr {
                    Some(expr) => StatementKind::Expression(expr),
                    None => StatementKind::Other(Vec::new()),
                }
            }
            "if_statement" => {
                let condition = node
                    .child_by_field_name("condition")
                    .map(|c| self.expr(&c));
                let then_branch = node
                    .child_by_field_name("consequence")
                    .map(|c| self.statement(&c));
                match (condition, then_branch) {
                    (Some(condition), Some(then_branch)) => StatementKind::If {
                        condition,
                        then_branch: Box::new(then_branch),
                        else_branch: node
                            .child_by_field_name("alternative")
                            .map(|a| Box::new(self.statement(&a))),
                    },
                    _ => StatementKind::Other(Vec::new()),
                }
            }
            "block" => StatementKind::Block(self.block(node)),
            "return_statement" => {
                let mut cursor = node.walk();
                let value = node
                    .named_children(&mut cursor)
                    .find(|c| !c.is_extra())
                    .map(|e| self.expr(&e));
                StatementKind::Return(value)
            }
            _ => StatementKind::Other(self.nested_exprs(node)),
        };
        Statement {
            kind,
            span: span_of(node),
            extended_span: self.extended_span(node),
            line: self.line(node),
        }
    }

    /// Expressions and nested statements of an unmodelled statement, flattened
    /// into expressions so references inside loops and try blocks stay visible.
    fn nested_exprs(&self, node: &Node) -> Vec<Expr> {
        let mut exprs = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.is_extra() {
                continue;
            }
            if is_statement_kind(child.kind()) || child.kind() == "block" {
                let statement = self.statement(&child);
                exprs.push(Expr {
                    kind: ExprKind::Other(statement_exprs(statement)),
                    span: span_of(&child),
                });
            } else {
                exprs.push(self.expr(&child));
            }
        }
        exprs
    }

    fn expr(&self, node: &Node) -> Expr {
        let span = span_of(node);
        let kind = match node.kind() {
            "this" => ExprKind::This,
            "null_literal" => ExprKind::Null,
            "identifier" => ExprKind::Name(self.text(node)),
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).find(|c| !c.is_extra());
                match inner {
                    Some(inner) => ExprKind::Parenthesized(Box::new(self.expr(&inner))),
                    None => ExprKind::Other(Vec::new()),
                }
            }
            "field_access" => match (
                node.child_by_field_name("object"),
                node.child_by_field_name("field"),
            ) {
                (Some(object), Some(field)) => ExprKind::FieldAccess {
                    target: Box::new(self.expr(&object)),
                    name: self.text(&field),
                },
                _ => ExprKind::Other(Vec::new()),
            },
            "method_invocation" => ExprKind::Call {
                target: node
                    .child_by_field_name("object")
                    .map(|o| Box::new(self.expr(&o))),
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(&n))
                    .unwrap_or_default(),
                args: node
                    .child_by_field_name("arguments")
                    .map(|a| self.arguments(&a))
                    .unwrap_or_default(),
            },
            "object_creation_expression" => {
                let mut cursor = node.walk();
                let body = node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "class_body")
                    .map(|b| self.class_body(&b));
                ExprKind::New {
                    ty: node
                        .child_by_field_name("type")
                        .map(|t| self.type_ref(&t))
                        .unwrap_or_else(TypeRef::object),
                    args: node
                        .child_by_field_name("arguments")
                        .map(|a| self.arguments(&a))
                        .unwrap_or_default(),
                    body,
                }
            }
            "binary_expression" => match (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some(op), Some(right)) => ExprKind::Binary {
                    op: self.text(&op),
                    left: Box::new(self.expr(&left)),
                    right: Box::new(self.expr(&right)),
                },
                _ => ExprKind::Other(self.child_exprs(node)),
            },
            "assignment_expression" => match (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some(right)) => ExprKind::Assign {
                    target: Box::new(self.expr(&left)),
                    value: Box::new(self.expr(&right)),
                },
                _ => ExprKind::Other(self.child_exprs(node)),
            },
            kind if kind.ends_with("_literal") || kind == "true" || kind == "false" => {
                ExprKind::Literal(self.text(node))
            }
            _ => ExprKind::Other(self.child_exprs(node)),
        };
        Expr { kind, span }
    }

    fn child_exprs(&self, node: &Node) -> Vec<Expr> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| !c.is_extra())
            .collect();
        children
            .into_iter()
            .map(|child| {
                if is_statement_kind(child.kind()) || child.kind() == "block" {
                    Expr {
                        kind: ExprKind::Other(statement_exprs(self.statement(&child))),
                        span: span_of(&child),
                    }
                } else {
                    self.expr(&child)
                }
            })
            .collect()
    }

    fn arguments(&self, node: &Node) -> Vec<Expr> {
        let mut cursor = node.walk();
        let args: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| !c.is_extra())
            .collect();
        args.iter().map(|a| self.expr(a)).collect()
    }

    fn type_ref(&self, node: &Node) -> TypeRef {
        match node.kind() {
            "void_type" => TypeRef::Void,
            "integral_type" | "floating_point_type" | "boolean_type" => TypeRef::Primitive {
                name: self.text(node),
            },
            "type_identifier" | "identifier" | "scoped_type_identifier" => {
                TypeRef::named(compact(&self.text(node)))
            }
            "generic_type" => {
                let mut cursor = node.walk();
                let mut name = String::new();
                let mut args = Vec::new();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "type_identifier" | "scoped_type_identifier" => {
                            name = compact(&self.text(&child))
                        }
                        "type_arguments" => args = self.type_arguments(&child),
                        _ => {}
                    }
                }
                TypeRef::Named { name, args }
            }
            "array_type" => TypeRef::Array {
                element: Box::new(
                    node.child_by_field_name("element")
                        .map(|e| self.type_ref(&e))
                        .unwrap_or_else(TypeRef::object),
                ),
            },
            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|c| !c.kind().ends_with("annotation"))
                    .last();
                inner
                    .map(|n| self.type_ref(&n))
                    .unwrap_or_else(TypeRef::object)
            }
            "wildcard" => self.wildcard(node),
            _ => TypeRef::named(compact(&self.text(node))),
        }
    }

    fn type_arguments(&self, node: &Node) -> Vec<TypeRef> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| !c.is_extra())
            .collect();
        children.iter().map(|c| self.type_ref(c)).collect()
    }

    fn wildcard(&self, node: &Node) -> TypeRef {
        let mut cursor = node.walk();
        let mut upper = true;
        let mut bound = None;
        for child in node.children(&mut cursor) {
            match child.kind() {
                "super" => upper = false,
                "extends" | "?" => {}
                _ if child.is_named() && !child.is_extra() => {
                    bound = Some(Box::new(self.type_ref(&child)))
                }
                _ => {}
            }
        }
        TypeRef::Wildcard { bound, upper }
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement")
        || kind == "local_variable_declaration"
        || kind == "explicit_constructor_invocation"
}

fn statement_exprs(statement: Statement) -> Vec<Expr> {
    match statement.kind {
        StatementKind::LocalVariable { declarators, .. } => {
            declarators.into_iter().filter_map(|d| d.init).collect()
        }
        StatementKind::Expression(e) => vec![e],
        StatementKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut exprs = vec![condition];
            exprs.extend(statement_exprs(*then_branch));
            if let Some(else_branch) = else_branch {
                exprs.extend(statement_exprs(*else_branch));
            }
            exprs
        }
        StatementKind::Block(block) => block
            .statements
            .into_iter()
            .flat_map(statement_exprs)
            .collect(),
        StatementKind::Return(value) => value.into_iter().collect(),
        StatementKind::Other(exprs) => exprs,
    }
}
