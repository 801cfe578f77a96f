//! Code generation for `ensure_method`
//!
//! Generated code follows the file's own indentation unit. Types are written
//! by the name other compilation units use for them, and a single-type import
//! is added when that name is not visible yet.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::CapabilityEntry;
use crate::components::{constructor, construction_flow, Component, Reference};
use crate::config::{ImplementationStyle, InnerPosition};
use crate::error::{EventwireError, Result};
use crate::java::ast::{Block, ClassBody, MethodDeclaration, Statement};
use crate::java::syntax::{
    detect_indent_unit, first_on_line, indentation_at, last_on_line, line_end_inclusive,
    line_start,
};
use crate::java::{Transaction, TypeRef};
use crate::listener_methods::{adapter_reference, CallbackMethodSpec};
use crate::model::ComponentModel;
use crate::routing::guards;
use crate::scanner::{Implementation, RegistrationSite, Shape};
use crate::types::{is_subtype, Origin, TypeDecl};

use super::{mentions, EditContext, Plan};

static TEMPLATE_VARIABLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());

/// Expand `${name}` variables; unknown variables expand to nothing
pub fn expand_template(template: &str, variables: &[(&str, &str)]) -> String {
    let Some(re) = TEMPLATE_VARIABLE.as_ref() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        variables
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    })
    .into_owned()
}

/// Make a Java identifier out of an expanded template
fn identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Component name as used in generated type names: `m_button` -> `button`
fn component_stem(name: &str) -> &str {
    name.strip_prefix("m_")
        .or_else(|| name.strip_prefix('_'))
        .filter(|s| !s.is_empty())
        .unwrap_or(name)
}

/// Add or locate `method` of capability `listener` on `component`.
///
/// Returns [`Plan::Unchanged`] when the method already exists for the
/// component, so calling it twice inserts the method once.
pub fn ensure_method(
    ctx: &EditContext<'_>,
    component: &str,
    listener: &str,
    method: &str,
) -> Result<Plan> {
    let model = ctx.model.component(component)?;
    let entry = model.entry(listener)?;
    let spec = entry
        .method(method)
        .ok_or_else(|| EventwireError::UnknownMethod {
            listener: entry.title.clone(),
            title: method.to_string(),
        })?;

    let mut generator = Generator::new(ctx);
    match model.site(&entry.title) {
        Some(site) => match site.shape {
            Shape::AnonymousImpl | Shape::NamedInnerImpl => {
                if site.location(spec).is_some() {
                    return Ok(Plan::Unchanged);
                }
                generator.add_to_existing(model, entry, site, spec)?;
            }
            Shape::SelfImpl => generator.ensure_self(model, entry, Some(site), spec)?,
        },
        None => match ctx.config.codegen.style {
            ImplementationStyle::Anonymous => generator.create_anonymous(model, entry, spec)?,
            ImplementationStyle::InnerClass => generator.create_named(model, entry, spec)?,
            ImplementationStyle::Interface => {
                if can_self_implement(ctx, &model.component, entry) {
                    generator.ensure_self(model, entry, None, spec)?
                } else {
                    tracing::debug!(
                        "{} cannot route {} through the designed class, using an anonymous class",
                        model.name(),
                        entry.title
                    );
                    generator.create_anonymous(model, entry, spec)?
                }
            }
        },
    }
    Ok(Plan::from_transaction(generator.finish()))
}

/// The designed class can implement interface callbacks for itself and for
/// components a routing guard can name
fn can_self_implement(ctx: &EditContext<'_>, component: &Component, entry: &CapabilityEntry) -> bool {
    let routable = matches!(
        component.reference,
        Reference::This | Reference::Field { initialized: true }
    );
    let interface = ctx
        .resolver
        .resolve(&entry.callback_decl)
        .is_some_and(TypeDecl::is_interface);
    routable && interface
}

/// Whole lines to insert at one offset
struct Insertion {
    offset: usize,
    /// Text before the lines, a newline when the offset is mid-line
    prefix: String,
    /// Text after the lines, restoring the indentation of a closing brace
    suffix: String,
    /// Indentation of the inserted lines
    indent: String,
}

impl Insertion {
    fn emit(&self, tx: &mut Transaction, lines: &[String]) {
        tx.insert(
            self.offset,
            format!("{}{}{}", self.prefix, lines.concat(), self.suffix),
        );
    }
}

struct Generator<'c, 'a> {
    ctx: &'c EditContext<'a>,
    text: &'a str,
    unit: String,
    tx: Transaction,
    imports: BTreeSet<String>,
    /// Members appended to the designed class, emitted together
    members: Vec<Vec<String>>,
    /// Stub names generated in this operation
    stubs: BTreeSet<String>,
}

impl<'c, 'a> Generator<'c, 'a> {
    fn new(ctx: &'c EditContext<'a>) -> Self {
        let text = ctx.text();
        Self {
            ctx,
            text,
            unit: detect_indent_unit(text),
            tx: ctx.source.transaction(),
            imports: BTreeSet::new(),
            members: Vec::new(),
            stubs: BTreeSet::new(),
        }
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    fn create_anonymous(
        &mut self,
        model: &ComponentModel,
        entry: &CapabilityEntry,
        spec: &CallbackMethodSpec,
    ) -> Result<()> {
        let (base, with_adapter) = self.implementation_base(entry);
        let base = self.type_name(&base);
        let point = self.registration_point(&model.component)?;
        let inner = format!("{}{}", point.indent, self.unit);

        let mut lines = vec![format!(
            "{}{}{}(new {}() {{\n",
            point.indent,
            model.component.receiver(),
            entry.registration_name,
            base
        )];
        for method in methods_to_generate(entry, spec, with_adapter) {
            let body = self.handler_body(&model.component, entry, method, method.key() == spec.key());
            lines.extend(self.method_lines(method, &inner, &body));
        }
        lines.push(format!("{}}});\n", point.indent));
        point.emit(&mut self.tx, &lines);
        Ok(())
    }

    fn create_named(
        &mut self,
        model: &ComponentModel,
        entry: &CapabilityEntry,
        spec: &CallbackMethodSpec,
    ) -> Result<()> {
        let callback = self
            .ctx
            .resolver
            .resolve(&entry.callback_decl)
            .ok_or_else(|| EventwireError::edit(format!("cannot resolve {}", entry.callback_decl)))?;
        let name = self.inner_class_name(&model.component, callback);
        let (base, with_adapter) = self.implementation_base(entry);
        let keyword = if !with_adapter && callback.is_interface() {
            "implements"
        } else {
            "extends"
        };
        let base = self.type_name(&base);

        let point = self.registration_point(&model.component)?;
        point.emit(
            &mut self.tx,
            &[format!(
                "{}{}{}(new {}());\n",
                point.indent,
                model.component.receiver(),
                entry.registration_name,
                name
            )],
        );

        let position = self.ctx.config.codegen.inner_position;
        let class_body = &self.ctx.class.body;
        let member = self.member_point(class_body, position);
        let inner = format!("{}{}", member.indent, self.unit);
        let mut lines = vec![format!(
            "{}private class {} {} {} {{\n",
            member.indent, name, keyword, base
        )];
        for method in methods_to_generate(entry, spec, with_adapter) {
            let body = self.handler_body(&model.component, entry, method, method.key() == spec.key());
            lines.extend(self.method_lines(method, &inner, &body));
        }
        lines.push(format!("{}}}\n", member.indent));
        match position {
            InnerPosition::First => {
                lines.push("\n".to_string());
                member.emit(&mut self.tx, &lines);
            }
            InnerPosition::Last => self.members.push(lines),
        }
        Ok(())
    }

    /// Append a missing method to an existing anonymous or named implementation
    fn add_to_existing(
        &mut self,
        model: &ComponentModel,
        entry: &CapabilityEntry,
        site: &RegistrationSite,
        spec: &CallbackMethodSpec,
    ) -> Result<()> {
        let ast = self.ctx.source.ast();
        let body: &ClassBody = match &site.implementation {
            Implementation::Anonymous { body, .. } => body,
            Implementation::Named { type_name, .. } => {
                let decl = ast
                    .find_type(type_name)
                    .ok_or_else(|| EventwireError::edit(format!("{} is not declared", type_name)))?;
                &decl.body
            }
            Implementation::SelfImpl => return Err(EventwireError::edit("not an inner implementation")),
        };
        let point = self.before_close(
            body.open_brace(),
            body.close_brace(),
            body.member_spans.first().map(|s| s.start),
        );
        let handler = self.handler_body(&model.component, entry, spec, true);
        let lines = self.method_lines(spec, &point.indent, &handler);
        point.emit(&mut self.tx, &lines);
        Ok(())
    }

    /// The designed class implements the callback; routes events of
    /// non-root components through a guard to a stub
    fn ensure_self(
        &mut self,
        model: &ComponentModel,
        entry: &CapabilityEntry,
        site: Option<&RegistrationSite>,
        spec: &CallbackMethodSpec,
    ) -> Result<()> {
        let ctx = self.ctx;
        let class = ctx.class;
        let component = &model.component;
        let callback = ctx
            .resolver
            .resolve(&entry.callback_decl)
            .ok_or_else(|| EventwireError::edit(format!("cannot resolve {}", entry.callback_decl)))?;

        let implemented = ctx
            .resolver
            .resolve(&class.name)
            .is_some_and(|decl| is_subtype(ctx.resolver, decl, callback));
        if !implemented {
            let name = self.type_name(&entry.callback_type);
            match class.interfaces_end {
                Some(end) => self.tx.insert(end, format!(", {}", name)),
                None => self.tx.insert(class.header_end, format!(" implements {}", name)),
            }
        }

        if site.is_none() {
            let point = self.registration_point(component)?;
            point.emit(
                &mut self.tx,
                &[format!(
                    "{}{}{}(this);\n",
                    point.indent,
                    component.receiver(),
                    entry.registration_name
                )],
            );
        }

        let member_indent = self.member_point(&class.body, InnerPosition::Last).indent;
        let routable = matches!(
            component.reference,
            Reference::This | Reference::Field { initialized: true }
        );
        for method in entry.methods.iter().filter(|m| m.is_abstract || m.key() == spec.key()) {
            let requested = method.key() == spec.key();
            match class.find_method(&method.name, method.arity()) {
                None => {
                    let body = if requested {
                        self.self_handler_body(component, entry, method)
                    } else {
                        Vec::new()
                    };
                    let lines = self.method_lines(method, &member_indent, &body);
                    self.members.push(lines);
                }
                Some(existing) if requested && routable => {
                    self.ensure_guard(component, entry, method, existing);
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Add a guard for the component to an existing self-implemented method
    /// unless the method already serves it
    fn ensure_guard(
        &mut self,
        component: &Component,
        entry: &CapabilityEntry,
        spec: &CallbackMethodSpec,
        method: &MethodDeclaration,
    ) {
        let Some(body) = &method.body else {
            return;
        };
        let components = self.ctx.model.plain_components();
        let existing = guards(self.ctx.class, method, &components);
        let serves = if existing.is_empty() {
            component.is_root()
        } else {
            existing.iter().any(|g| g.target == component.name)
        };
        if serves {
            return;
        }
        let point = self.block_close_point(body);
        let Some(lines) = self.guard_lines(component, entry, spec, &point.indent) else {
            return;
        };
        point.emit(&mut self.tx, &lines);
    }

    // ------------------------------------------------------------------
    // Pieces
    // ------------------------------------------------------------------

    /// Base type of a generated implementation: the adapter when there is one
    fn implementation_base(&self, entry: &CapabilityEntry) -> (TypeRef, bool) {
        match entry.adapter.as_deref().and_then(|a| self.ctx.resolver.resolve(a)) {
            Some(adapter) => (adapter_reference(adapter, &entry.callback_type), true),
            None => (entry.callback_type.clone(), false),
        }
    }

    fn handler_body(
        &mut self,
        component: &Component,
        entry: &CapabilityEntry,
        method: &CallbackMethodSpec,
        requested: bool,
    ) -> Vec<String> {
        if !requested || !self.ctx.config.codegen.create_stub {
            return Vec::new();
        }
        match self.stub_for(component, entry, method) {
            Some(stub) => vec![format!("{}({});\n", stub, method.params[0].name)],
            None => Vec::new(),
        }
    }

    /// Body of a new self-implemented method for `component`
    fn self_handler_body(
        &mut self,
        component: &Component,
        entry: &CapabilityEntry,
        method: &CallbackMethodSpec,
    ) -> Vec<String> {
        if component.is_root() {
            return self.handler_body(component, entry, method, true);
        }
        // body lines are indented again by method_lines
        self.guard_lines(component, entry, method, "").unwrap_or_default()
    }

    /// `if (e.getSource() == target) { stub(e); }` lines
    fn guard_lines(
        &mut self,
        component: &Component,
        entry: &CapabilityEntry,
        method: &CallbackMethodSpec,
        indent: &str,
    ) -> Option<Vec<String>> {
        let event = method.params.first()?.name.clone();
        let stub = self.stub_for(component, entry, method)?;
        let target = if component.is_root() { "this" } else { component.name.as_str() };
        Some(vec![
            format!("{}if ({}.getSource() == {}) {{\n", indent, event, target),
            format!("{}{}{}({});\n", indent, self.unit, stub, event),
            format!("{}}}\n", indent),
        ])
    }

    /// Name of the stub for `method`, generating the stub unless the designed
    /// class already declares it
    fn stub_for(
        &mut self,
        component: &Component,
        entry: &CapabilityEntry,
        method: &CallbackMethodSpec,
    ) -> Option<String> {
        let param = method.params.first()?;
        if method.params.len() != 1 {
            return None;
        }
        let name = identifier(&expand_template(
            &self.ctx.config.codegen.stub_name_template,
            &[
                ("component_name", &component.name),
                ("event_name", &method.name),
                ("listener_name", &entry.title),
            ],
        ));
        if self.ctx.class.find_method(&name, 1).is_none() && self.stubs.insert(name.clone()) {
            let indent = self.member_point(&self.ctx.class.body, InnerPosition::Last).indent;
            let ty = self.type_name(&param.ty);
            let modifier = if self.ctx.config.codegen.final_parameters { "final " } else { "" };
            self.members.push(vec![
                format!("{}private void {}({}{} {}) {{\n", indent, name, modifier, ty, param.name),
                format!("{}}}\n", indent),
            ]);
        }
        Some(name)
    }

    fn method_lines(&mut self, method: &CallbackMethodSpec, indent: &str, body: &[String]) -> Vec<String> {
        let codegen = &self.ctx.config.codegen;
        let modifier = if codegen.final_parameters { "final " } else { "" };
        let add_override = codegen.add_override;
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{}{} {}", modifier, self.type_name(&p.ty), p.name))
            .collect();
        let return_type = self.type_name(&method.return_type);

        let mut lines = Vec::new();
        if add_override {
            lines.push(format!("{}@Override\n", indent));
        }
        lines.push(format!(
            "{}public {} {}({}) {{\n",
            indent,
            return_type,
            method.name,
            params.join(", ")
        ));
        for line in body {
            lines.push(format!("{}{}{}", indent, self.unit, line));
        }
        if let Some(value) = default_value(&method.return_type) {
            lines.push(format!("{}{}return {};\n", indent, self.unit, value));
        }
        lines.push(format!("{}}}\n", indent));
        lines
    }

    fn inner_class_name(&self, component: &Component, callback: &TypeDecl) -> String {
        let base = capitalize(&identifier(&expand_template(
            &self.ctx.config.codegen.inner_name_template,
            &[
                ("component_name", component_stem(&component.name)),
                ("listener_className", &callback.name),
            ],
        )));
        let taken = |name: &str| {
            self.ctx.source.ast().find_type(name).is_some()
                || self.ctx.class.body.has_member_named(name)
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Source text of a type, recording the import it needs
    fn type_name(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { args, .. } => {
                let base = match self.ctx.resolver.resolve_ref(ty) {
                    Some(decl) => {
                        if let Some(import) = self.import_for(decl) {
                            self.imports.insert(import);
                        }
                        decl.source_name.clone()
                    }
                    None => ty.simple_name().unwrap_or_default().to_string(),
                };
                if args.is_empty() {
                    base
                } else {
                    let args: Vec<String> = args.iter().map(|a| self.type_name(a)).collect();
                    format!("{}<{}>", base, args.join(", "))
                }
            }
            TypeRef::Array { element } => format!("{}[]", self.type_name(element)),
            TypeRef::Wildcard {
                bound: Some(bound),
                upper,
            } => {
                let bound = self.type_name(bound);
                if *upper {
                    format!("? extends {}", bound)
                } else {
                    format!("? super {}", bound)
                }
            }
            other => other.display(),
        }
    }

    /// Import making the top-level declaration of `decl` visible, if one is missing
    fn import_for(&self, decl: &TypeDecl) -> Option<String> {
        if decl.origin == Origin::Unit {
            return None;
        }
        let package = decl.package.as_deref()?;
        let unit = self.ctx.source.ast();
        if package == "java.lang" || unit.package.as_deref() == Some(package) {
            return None;
        }
        let top = decl.source_name.split('.').next().unwrap_or(&decl.source_name);
        let qualified = format!("{}.{}", package, top);
        if unit.imports_type(&qualified) {
            return None;
        }
        Some(qualified)
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    /// Where registration code for a component goes: after the last
    /// construction statement using a local or lazily assigned component,
    /// otherwise at the end of the constructor
    fn registration_point(&self, component: &Component) -> Result<Insertion> {
        let class = self.ctx.class;
        let body = constructor(class)
            .and_then(|c| c.body.as_ref())
            .ok_or_else(|| EventwireError::NoConstructionCode {
                class: class.name.clone(),
            })?;

        let anchor: Option<&Statement> = match (component.reference, component.creation) {
            (Reference::Local | Reference::Field { initialized: false }, Some(creation)) => {
                let flow = construction_flow(class);
                let block = flow
                    .iter()
                    .find(|f| f.statement.extended_span == creation)
                    .map(|f| f.block);
                flow.iter()
                    .filter(|f| Some(f.block) == block && f.statement.span.start >= creation.start)
                    .filter(|f| {
                        f.statement.extended_span == creation || mentions(f.statement, &component.name)
                    })
                    .last()
                    .map(|f| f.statement)
            }
            _ => None,
        };
        Ok(match anchor {
            Some(statement) => self.after_statement(statement),
            None => self.block_close_point(body),
        })
    }

    fn after_statement(&self, statement: &Statement) -> Insertion {
        let end = statement.span.end;
        let indent = indentation_at(self.text, statement.span.start).to_string();
        if last_on_line(self.text, end) {
            Insertion {
                offset: line_end_inclusive(self.text, end),
                prefix: String::new(),
                suffix: String::new(),
                indent,
            }
        } else {
            Insertion {
                offset: end,
                prefix: "\n".to_string(),
                suffix: indent.clone(),
                indent,
            }
        }
    }

    fn block_close_point(&self, block: &Block) -> Insertion {
        let close = block.span.end.saturating_sub(1);
        self.before_close(
            block.span.start,
            close,
            block.statements.first().map(|s| s.span.start),
        )
    }

    /// Lines before the closing brace at `close` of a block opened at `open`,
    /// indented like `first_child` or one unit deeper than the opening line
    fn before_close(&self, open: usize, close: usize, first_child: Option<usize>) -> Insertion {
        let indent = match first_child {
            Some(child) if first_on_line(self.text, child) => indentation_at(self.text, child).to_string(),
            _ => format!("{}{}", indentation_at(self.text, open), self.unit),
        };
        if first_on_line(self.text, close) {
            Insertion {
                offset: line_start(self.text, close),
                prefix: String::new(),
                suffix: String::new(),
                indent,
            }
        } else {
            Insertion {
                offset: close,
                prefix: "\n".to_string(),
                suffix: indentation_at(self.text, close).to_string(),
                indent,
            }
        }
    }

    /// Member position in a class body
    fn member_point(&self, body: &ClassBody, position: InnerPosition) -> Insertion {
        let first = body.member_spans.first().map(|s| s.start);
        match position {
            InnerPosition::Last => self.before_close(body.open_brace(), body.close_brace(), first),
            InnerPosition::First => {
                let open = body.open_brace();
                let mut point = self.before_close(open, body.close_brace(), first);
                if last_on_line(self.text, open + 1) {
                    point.offset = line_end_inclusive(self.text, open);
                    point.prefix = String::new();
                    point.suffix = String::new();
                } else {
                    point.offset = open + 1;
                    point.prefix = "\n".to_string();
                    point.suffix = String::new();
                }
                point
            }
        }
    }

    fn finish(mut self) -> Transaction {
        if !self.members.is_empty() {
            let point = self.member_point(&self.ctx.class.body, InnerPosition::Last);
            let mut lines = Vec::new();
            for member in std::mem::take(&mut self.members) {
                lines.push("\n".to_string());
                lines.extend(member);
            }
            point.emit(&mut self.tx, &lines);
        }
        if !self.imports.is_empty() {
            let unit = self.ctx.source.ast();
            let lines: Vec<String> = self
                .imports
                .iter()
                .map(|q| format!("import {};\n", q))
                .collect();
            let (offset, prefix, suffix) = match (unit.imports.last(), unit.package_end) {
                (Some(import), _) => (line_end_inclusive(self.text, import.span.end), "", ""),
                (None, Some(end)) => (line_end_inclusive(self.text, end), "\n", ""),
                (None, None) => (0, "", "\n"),
            };
            tracing::debug!("adding imports {:?}", self.imports);
            self.tx.insert(offset, format!("{}{}{}", prefix, lines.concat(), suffix));
        }
        self.tx
    }
}

/// Methods a new implementation defines: the requested one, plus every other
/// abstract method when no adapter supplies defaults
fn methods_to_generate<'e>(
    entry: &'e CapabilityEntry,
    spec: &CallbackMethodSpec,
    with_adapter: bool,
) -> Vec<&'e CallbackMethodSpec> {
    entry
        .methods
        .iter()
        .filter(|m| m.key() == spec.key() || (!with_adapter && m.is_abstract))
        .collect()
}

fn default_value(ty: &TypeRef) -> Option<&'static str> {
    match ty {
        TypeRef::Void => None,
        TypeRef::Primitive { name } if name == "boolean" => Some("false"),
        TypeRef::Primitive { name } if name == "char" => Some("'\\0'"),
        TypeRef::Primitive { .. } => Some("0"),
        _ => Some("null"),
    }
}
