//! Capability catalog
//!
//! Enumerates the listener registration methods a component type exposes:
//! `add<Name>Listener`, `add<Name>Handler` and the literal `addListener`, each
//! taking exactly one callback argument. Discovery is a pure function of the
//! type resolver; anything that cannot be resolved is left out.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::java::TypeRef;
use crate::listener_methods::{find_adapter, methods_for, CallbackMethodSpec};
use crate::types::toolkit::EVENT_LISTENER;
use crate::types::{ancestors, is_assignable, Instantiation, TypeDecl, TypeEnv, TypeResolver};

static REGISTRATION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^add([A-Z][A-Za-z0-9_]*?)(Listener|Handler)$").ok());

const LITERAL_REGISTRATION: &str = "addListener";

/// Whether the capability is declared by the component's own type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredBy {
    Own,
    Ancestor,
}

/// One registration capability of a component
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityEntry {
    /// Qualified name of the type declaring the registration method
    pub owner_type: String,
    pub registration_name: String,
    /// Unique within one component's catalog
    pub title: String,
    /// Callback parameter type after generic substitution
    pub callback_type: TypeRef,
    /// Qualified name of the callback declaration
    pub callback_decl: String,
    pub callback_is_interface: bool,
    pub deprecated: bool,
    pub declared_by: DeclaredBy,
    /// Qualified name of the adapter class, when one exists
    pub adapter: Option<String>,
    pub methods: Vec<CallbackMethodSpec>,
}

impl CapabilityEntry {
    pub fn method(&self, title: &str) -> Option<&CallbackMethodSpec> {
        self.methods
            .iter()
            .find(|m| m.title == title)
            .or_else(|| self.methods.iter().find(|m| m.name == title))
    }

    pub fn method_by_key(&self, key: &str) -> Option<&CallbackMethodSpec> {
        self.methods.iter().find(|m| m.key() == key)
    }
}

/// Ordered capability set of one component
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub entries: Vec<CapabilityEntry>,
}

impl Catalog {
    pub fn find(&self, title: &str) -> Option<&CapabilityEntry> {
        self.entries.iter().find(|e| e.title == title)
    }

    /// Entries registered through the given method name
    pub fn by_registration<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CapabilityEntry> {
        self.entries.iter().filter(move |e| e.registration_name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a method name looks like a listener registration
pub fn is_registration_name(name: &str) -> bool {
    name == LITERAL_REGISTRATION
        || REGISTRATION.as_ref().is_some_and(|re| re.is_match(name))
}

/// Group title of a registration name: `addMouseWheelListener` -> `mouseWheel`
pub fn registration_title(name: &str) -> String {
    if name == LITERAL_REGISTRATION {
        return name.to_string();
    }
    let stem = REGISTRATION
        .as_ref()
        .and_then(|re| re.captures(name))
        .and_then(|c| c.get(1));
    match stem {
        Some(stem) => lower_camel(stem.as_str()),
        None => name.to_string(),
    }
}

fn lower_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

struct Candidate<'r> {
    owner: &'r TypeDecl,
    registration_name: String,
    callback_type: TypeRef,
    callback: &'r TypeDecl,
    deprecated: bool,
    own: bool,
}

/// Build the catalog of a component whose type is `component` as instantiated
/// in an environment where `outer` binds the designed class's parameters.
pub fn build_catalog<R: TypeResolver + ?Sized>(
    resolver: &R,
    component: &TypeRef,
    outer: &TypeEnv,
) -> Catalog {
    let inst = Instantiation::of(resolver, component, outer);
    let decls = inst.declarations(resolver);
    let Some(own_type) = decls.first().map(|d| d.qualified.clone()) else {
        tracing::debug!("no declaration for component type {}", component.display());
        return Catalog::default();
    };

    // collect per registration name, most derived declaration first
    let mut hidden: HashSet<String> = HashSet::new();
    let mut groups: Vec<(String, Vec<Candidate>)> = Vec::new();
    for decl in &decls {
        let env = inst.env_for(decl);
        for method in &decl.methods {
            if !method.is_public || method.is_static || method.params.len() != 1 {
                continue;
            }
            if !is_registration_name(&method.name) {
                continue;
            }
            let callback_type = env.apply(&method.params[0].ty);
            let key = format!("{}({})", method.name, callback_type.erasure().signature_key());
            if !hidden.insert(key) {
                continue;
            }
            let Some(callback) = resolver.resolve_ref(&callback_type) else {
                tracing::debug!(
                    "{}.{}: unresolved callback type {}",
                    decl.name,
                    method.name,
                    callback_type.display()
                );
                continue;
            };
            if !is_callback_type(resolver, callback) {
                tracing::debug!(
                    "{}.{}: {} is not a listener type",
                    decl.name,
                    method.name,
                    callback.qualified
                );
                continue;
            }
            let candidate = Candidate {
                owner: decl,
                registration_name: method.name.clone(),
                callback_type,
                callback,
                deprecated: method.deprecated,
                own: decl.qualified == own_type,
            };
            match groups.iter_mut().find(|(name, _)| *name == method.name) {
                Some((_, group)) => merge_overload(resolver, group, candidate),
                None => groups.push((method.name.clone(), vec![candidate])),
            }
        }
    }

    let mut entries = Vec::new();
    for (name, group) in groups {
        let base = registration_title(&name);
        let qualify = group.len() > 1;
        if qualify {
            tracing::debug!("{} is overloaded, qualifying titles", name);
        }
        for candidate in group {
            let title = if qualify {
                format!("{}({})", base, candidate.callback.qualified)
            } else {
                base.clone()
            };
            let methods = methods_for(resolver, &candidate.callback_type, &title);
            let adapter = find_adapter(resolver, candidate.callback, &methods).map(|a| a.qualified.clone());
            entries.push(CapabilityEntry {
                owner_type: candidate.owner.qualified.clone(),
                registration_name: candidate.registration_name,
                title,
                callback_type: candidate.callback_type,
                callback_decl: candidate.callback.qualified.clone(),
                callback_is_interface: candidate.callback.is_interface(),
                deprecated: candidate.deprecated,
                declared_by: if candidate.own {
                    DeclaredBy::Own
                } else {
                    DeclaredBy::Ancestor
                },
                adapter,
                methods,
            });
        }
    }
    entries.sort_by(|a, b| a.title.cmp(&b.title));
    Catalog { entries }
}

/// Interfaces, abstract classes, and anything in the `EventListener` family
fn is_callback_type<R: TypeResolver + ?Sized>(resolver: &R, decl: &TypeDecl) -> bool {
    decl.is_interface()
        || decl.is_abstract
        || ancestors(resolver, decl)
            .iter()
            .any(|a| a.qualified == EVENT_LISTENER)
}

/// Keep only the most general of assignment-compatible overloads
fn merge_overload<'r, R: TypeResolver + ?Sized>(
    resolver: &R,
    group: &mut Vec<Candidate<'r>>,
    candidate: Candidate<'r>,
) {
    for existing in group.iter_mut() {
        if is_assignable(resolver, &existing.callback_type, &candidate.callback_type) {
            *existing = candidate;
            return;
        }
        if is_assignable(resolver, &candidate.callback_type, &existing.callback_type) {
            return;
        }
    }
    group.push(candidate);
}
