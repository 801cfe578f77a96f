//! Type resolution
//!
//! Declarations come from three places, in increasing priority:
//!
//! - the bundled toolkit surface (`toolkit`), parsed from Java stubs,
//! - project sources loaded from class-path directories,
//! - the unit being designed, layered on top for each analysis pass.
//!
//! Everything else in the crate asks questions through [`TypeResolver`] and
//! never looks at how a declaration was obtained.

pub mod generics;
pub mod toolkit;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use serde::Serialize;

use crate::error::{EventwireError, Result};
use crate::java::ast::{CompilationUnit, DeclKind, MethodDeclaration, TypeDeclaration, TypeParam};
use crate::java::parse::parse_unit;
use crate::java::TypeRef;

pub use generics::{Instantiation, TypeEnv};

/// Where a declaration was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Toolkit,
    Project,
    Unit,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSig {
    pub name: String,
    pub ty: TypeRef,
}

/// Method as seen through type resolution
#[derive(Debug, Clone, Serialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<ParamSig>,
    pub return_type: TypeRef,
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub deprecated: bool,
}

impl MethodSig {
    fn from_declaration(method: &MethodDeclaration, kind: DeclKind) -> Self {
        let in_interface = kind == DeclKind::Interface;
        Self {
            name: method.name.clone(),
            params: method
                .params
                .iter()
                .map(|p| ParamSig {
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                })
                .collect(),
            return_type: method.return_type.clone(),
            // interface members are implicitly public
            is_public: method.modifiers.is_public || (in_interface && !method.modifiers.is_private),
            is_protected: method.modifiers.is_protected,
            is_private: method.modifiers.is_private,
            is_static: method.modifiers.is_static,
            is_abstract: method.is_abstract_in(kind),
            is_final: method.modifiers.is_final,
            deprecated: method.modifiers.deprecated,
        }
    }

    /// Overridable from an anonymous or inner subclass
    pub fn is_overridable(&self) -> bool {
        !self.is_static && !self.is_final && !self.is_private
    }

    /// Name plus erased parameter types, for override matching
    pub fn erased_key(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.signature_key()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

/// A resolved type declaration
#[derive(Debug, Clone, Serialize)]
pub struct TypeDecl {
    /// Simple name, `MyListener`
    pub name: String,
    /// Fully qualified name, `test.MyPanel.MyListener`
    pub qualified: String,
    /// Name used to reference the type from other compilation units, `MyPanel.MyListener`
    pub source_name: String,
    pub package: Option<String>,
    /// Qualified name of the enclosing declaration for nested types
    pub outer: Option<String>,
    pub kind: DeclKind,
    pub is_abstract: bool,
    #[serde(skip)]
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub methods: Vec<MethodSig>,
    pub origin: Origin,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        self.kind == DeclKind::Interface
    }

    pub fn is_class(&self) -> bool {
        self.kind == DeclKind::Class
    }

    /// Declared supertypes: superclass first, then interfaces
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Reference to this declaration with its own type parameters as arguments
    pub fn self_reference(&self) -> TypeRef {
        TypeRef::generic(
            self.qualified.clone(),
            self.type_params.iter().map(|p| TypeRef::var(&p.name)).collect(),
        )
    }

    pub fn is_object(&self) -> bool {
        self.qualified == "java.lang.Object"
    }
}

/// Answers "what is the declaration behind this name?"
pub trait TypeResolver {
    fn resolve(&self, name: &str) -> Option<&TypeDecl>;

    /// Resolve the declaration behind a type reference
    fn resolve_ref(&self, ty: &TypeRef) -> Option<&TypeDecl> {
        ty.name().and_then(|name| self.resolve(name))
    }
}

/// Registry of declarations indexed by qualified, source and simple name
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    decls: Vec<TypeDecl>,
    by_qualified: HashMap<String, usize>,
    by_source_name: HashMap<String, Vec<usize>>,
    by_simple: HashMap<String, Vec<usize>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the bundled toolkit declarations
    pub fn with_toolkit() -> Result<Self> {
        let mut registry = Self::new();
        for (name, source) in toolkit::SOURCES {
            let unit = parse_unit(source).map_err(|e| EventwireError::ParseFailure {
                message: format!("toolkit stub {}: {}", name, e),
            })?;
            registry.add_unit(&unit, Origin::Toolkit);
        }
        tracing::debug!("loaded {} toolkit declarations", registry.len());
        Ok(registry)
    }

    /// Registry of the declarations of one unit
    pub fn from_unit(unit: &CompilationUnit, origin: Origin) -> Self {
        let mut registry = Self::new();
        registry.add_unit(unit, origin);
        registry
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.decls.iter()
    }

    pub fn add_unit(&mut self, unit: &CompilationUnit, origin: Origin) {
        for ty in &unit.types {
            self.add_declaration(ty, unit.package.as_deref(), None, origin);
        }
    }

    /// Parse Java source text and register its declarations
    pub fn add_source(&mut self, source: &str, origin: Origin) -> Result<()> {
        let unit = parse_unit(source)?;
        self.add_unit(&unit, origin);
        Ok(())
    }

    /// Register every `.java` file below `dir` as a project declaration
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Err(EventwireError::FileNotFound {
                path: dir.display().to_string(),
            });
        }
        let before = self.len();
        for entry in ignore::WalkBuilder::new(dir).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping class-path entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }
            let source = std::fs::read_to_string(path).map_err(|e| EventwireError::IoError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            match parse_unit(&source) {
                Ok(unit) => self.add_unit(&unit, Origin::Project),
                Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
            }
        }
        let added = self.len() - before;
        tracing::debug!("loaded {} declarations from {}", added, dir.display());
        Ok(added)
    }

    fn add_declaration(
        &mut self,
        ty: &TypeDeclaration,
        package: Option<&str>,
        outer: Option<(&str, &str)>,
        origin: Origin,
    ) {
        let (qualified, source_name) = match outer {
            Some((outer_qualified, outer_source)) => (
                format!("{}.{}", outer_qualified, ty.name),
                format!("{}.{}", outer_source, ty.name),
            ),
            None => (
                match package {
                    Some(pkg) => format!("{}.{}", pkg, ty.name),
                    None => ty.name.clone(),
                },
                ty.name.clone(),
            ),
        };

        let superclass = match (&ty.superclass, ty.kind) {
            (Some(sup), _) => Some(sup.clone()),
            (None, DeclKind::Class) if qualified != "java.lang.Object" => Some(TypeRef::object()),
            _ => None,
        };
        let decl = TypeDecl {
            name: ty.name.clone(),
            qualified: qualified.clone(),
            source_name: source_name.clone(),
            package: package.map(str::to_string),
            outer: outer.map(|(q, _)| q.to_string()),
            kind: ty.kind,
            is_abstract: ty.modifiers.is_abstract || ty.kind == DeclKind::Interface,
            type_params: ty.type_params.clone(),
            superclass,
            interfaces: ty.interfaces.clone(),
            methods: ty
                .body
                .methods
                .iter()
                .filter(|m| !m.is_constructor)
                .map(|m| MethodSig::from_declaration(m, ty.kind))
                .collect(),
            origin,
        };
        self.insert(decl);

        for nested in &ty.body.types {
            self.add_declaration(nested, package, Some((&qualified, &source_name)), origin);
        }
    }

    fn insert(&mut self, decl: TypeDecl) {
        let index = self.decls.len();
        self.by_qualified.insert(decl.qualified.clone(), index);
        self.by_source_name
            .entry(decl.source_name.clone())
            .or_default()
            .push(index);
        self.by_simple.entry(decl.name.clone()).or_default().push(index);
        self.decls.push(decl);
    }

    fn best(&self, candidates: Option<&Vec<usize>>) -> Option<&TypeDecl> {
        candidates?
            .iter()
            .map(|&i| &self.decls[i])
            // later units shadow earlier ones of the same priority
            .max_by_key(|d| d.origin)
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Option<&TypeDecl> {
        if let Some(&index) = self.by_qualified.get(name) {
            return Some(&self.decls[index]);
        }
        if let Some(decl) = self.best(self.by_source_name.get(name)) {
            return Some(decl);
        }
        let simple = name.rsplit('.').next().unwrap_or(name);
        self.best(self.by_simple.get(simple))
    }
}

/// Resolver that consults `top` before `base`
pub struct Layered<'a> {
    pub top: &'a TypeRegistry,
    pub base: &'a TypeRegistry,
}

impl TypeResolver for Layered<'_> {
    fn resolve(&self, name: &str) -> Option<&TypeDecl> {
        self.top.resolve(name).or_else(|| self.base.resolve(name))
    }
}

/// Supertype closure of a declaration (excluding itself), breadth first.
/// Unresolvable supertypes are skipped.
pub fn ancestors<'r, R: TypeResolver + ?Sized>(resolver: &'r R, decl: &TypeDecl) -> Vec<&'r TypeDecl> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(decl.qualified.clone());
    let mut queue: VecDeque<TypeRef> = decl.supertypes().cloned().collect();
    let mut result = Vec::new();
    while let Some(ty) = queue.pop_front() {
        let Some(sup) = resolver.resolve_ref(&ty) else {
            tracing::debug!("unresolved supertype {} of {}", ty.display(), decl.qualified);
            continue;
        };
        if !seen.insert(sup.qualified.clone()) {
            continue;
        }
        queue.extend(sup.supertypes().cloned());
        result.push(sup);
    }
    result
}

/// Whether `decl` is `target` or one of its subtypes
pub fn is_subtype<R: TypeResolver + ?Sized>(resolver: &R, decl: &TypeDecl, target: &TypeDecl) -> bool {
    decl.qualified == target.qualified
        || ancestors(resolver, decl)
            .iter()
            .any(|a| a.qualified == target.qualified)
}

/// Whether a value of type `from` can be passed where `to` is expected (erasure only)
pub fn is_assignable<R: TypeResolver + ?Sized>(resolver: &R, from: &TypeRef, to: &TypeRef) -> bool {
    match (resolver.resolve_ref(from), resolver.resolve_ref(to)) {
        (Some(from), Some(to)) => is_subtype(resolver, from, to),
        _ => from.erasure() == to.erasure(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_toolkit().unwrap();
        registry
            .add_source(
                r#"package test;
public class MyPanel extends javax.swing.JPanel {
  public interface MyListener {
    void handle(MyEvent event);
  }
  public class MyEvent {
  }
}
"#,
                Origin::Project,
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_resolve_by_qualified_simple_and_source_name() {
        let registry = registry();
        assert_eq!(
            registry.resolve("java.awt.event.KeyListener").unwrap().name,
            "KeyListener"
        );
        assert_eq!(
            registry.resolve("KeyEvent").unwrap().qualified,
            "java.awt.event.KeyEvent"
        );
        let nested = registry.resolve("MyPanel.MyListener").unwrap();
        assert_eq!(nested.qualified, "test.MyPanel.MyListener");
        assert_eq!(nested.outer.as_deref(), Some("test.MyPanel"));
        assert!(nested.is_interface());
        assert_eq!(registry.resolve("MyListener").unwrap().source_name, "MyPanel.MyListener");
    }

    #[test]
    fn test_ancestors_and_subtyping() {
        let registry = registry();
        let panel = registry.resolve("MyPanel").unwrap();
        let names: Vec<&str> = ancestors(&registry, panel)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["JPanel", "JComponent", "Container", "Component", "Object"]);

        let adapter = registry.resolve("KeyAdapter").unwrap();
        let listener = registry.resolve("KeyListener").unwrap();
        let marker = registry.resolve("EventListener").unwrap();
        assert!(is_subtype(&registry, adapter, listener));
        assert!(is_subtype(&registry, adapter, marker));
        assert!(!is_subtype(&registry, listener, adapter));
    }

    #[test]
    fn test_layered_prefers_top() {
        let base = registry();
        let unit = parse_unit("class KeyEvent {}").unwrap();
        let top = TypeRegistry::from_unit(&unit, Origin::Unit);
        let layered = Layered { top: &top, base: &base };
        assert_eq!(layered.resolve("KeyEvent").unwrap().origin, Origin::Unit);
        assert_eq!(layered.resolve("KeyListener").unwrap().origin, Origin::Toolkit);
    }

    #[test]
    fn test_interface_methods_are_public_and_abstract() {
        let registry = registry();
        let listener = registry.resolve("KeyListener").unwrap();
        assert_eq!(listener.methods.len(), 3);
        assert!(listener.methods.iter().all(|m| m.is_public && m.is_abstract));
        let adapter = registry.resolve("KeyAdapter").unwrap();
        assert!(adapter.is_abstract);
        assert!(adapter.methods.iter().all(|m| !m.is_abstract));
    }
}
