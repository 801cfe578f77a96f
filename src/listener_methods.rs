//! Listener method registry
//!
//! For a callback type (already substituted at the capability's use site) this
//! lists the methods an implementation must or may define, and finds the adapter
//! class an implementation can extend instead of implementing every method.

use std::collections::HashSet;

use serde::Serialize;

use crate::java::TypeRef;
use crate::types::{Instantiation, ParamSig, TypeDecl, TypeEnv, TypeResolver};

const OBJECT_QUALIFIED: &str = "java.lang.Object";

/// One method a callback implementation can define
#[derive(Debug, Clone, Serialize)]
pub struct CallbackMethodSpec {
    pub name: String,
    /// Parameter types after generic substitution
    pub params: Vec<ParamSig>,
    pub return_type: TypeRef,
    /// Short title shown under the listener group, `pressed` for `keyPressed`
    pub title: String,
    pub index: usize,
    /// Qualified name of the declaration the method comes from
    pub declared_in: String,
    /// False for the concrete methods of adapter-style callback bases
    pub is_abstract: bool,
}

impl CallbackMethodSpec {
    /// Name plus erased parameter types
    pub fn key(&self) -> String {
        signature_key(&self.name, self.params.iter().map(|p| &p.ty))
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn signature_key<'a>(name: &str, params: impl Iterator<Item = &'a TypeRef>) -> String {
    let params: Vec<String> = params.map(|t| t.erasure().signature_key()).collect();
    format!("{}({})", name, params.join(","))
}

/// Methods an implementation of `callback` can define, in declaration order.
///
/// Abstract methods are gathered from the callback declaration and then its
/// supertypes breadth first, skipping duplicates and anything a more derived
/// class already implements. When there are none, every overridable concrete
/// method of the class chain is offered instead.
pub fn methods_for<R: TypeResolver + ?Sized>(
    resolver: &R,
    callback: &TypeRef,
    group_title: &str,
) -> Vec<CallbackMethodSpec> {
    let inst = Instantiation::of(resolver, callback, &TypeEnv::new());
    let decls: Vec<&TypeDecl> = inst
        .declarations(resolver)
        .into_iter()
        .filter(|d| d.qualified != OBJECT_QUALIFIED)
        .collect();

    let mut implemented: HashSet<String> = HashSet::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut abstract_methods = Vec::new();
    for decl in &decls {
        let env = inst.env_for(decl);
        for method in &decl.methods {
            if method.is_static {
                continue;
            }
            let params = substitute_params(&method.params, &env);
            let key = signature_key(&method.name, params.iter().map(|p| &p.ty));
            if method.is_abstract {
                if !implemented.contains(&key) && seen.insert(key) {
                    abstract_methods.push(spec(method, params, &env, decl, true));
                }
            } else if decl.is_class() {
                implemented.insert(key);
            }
        }
    }

    let mut methods = if abstract_methods.is_empty() {
        let mut seen: HashSet<String> = HashSet::new();
        let mut concrete = Vec::new();
        for decl in decls.iter().filter(|d| d.is_class()) {
            let env = inst.env_for(decl);
            for method in decl.methods.iter().filter(|m| m.is_overridable() && !m.is_abstract) {
                let params = substitute_params(&method.params, &env);
                let key = signature_key(&method.name, params.iter().map(|p| &p.ty));
                if seen.insert(key) {
                    concrete.push(spec(method, params, &env, decl, false));
                }
            }
        }
        concrete
    } else {
        abstract_methods
    };

    for (index, method) in methods.iter_mut().enumerate() {
        method.index = index;
        method.title = method_title(group_title, &method.name);
    }
    methods
}

fn substitute_params(params: &[ParamSig], env: &TypeEnv) -> Vec<ParamSig> {
    params
        .iter()
        .map(|p| ParamSig {
            name: p.name.clone(),
            ty: env.apply(&p.ty),
        })
        .collect()
}

fn spec(
    method: &crate::types::MethodSig,
    params: Vec<ParamSig>,
    env: &TypeEnv,
    decl: &TypeDecl,
    is_abstract: bool,
) -> CallbackMethodSpec {
    CallbackMethodSpec {
        name: method.name.clone(),
        params,
        return_type: env.apply(&method.return_type),
        title: method.name.clone(),
        index: 0,
        declared_in: decl.qualified.clone(),
        is_abstract,
    }
}

/// `keyPressed` under group `key` becomes `pressed`; names that do not carry
/// the group prefix keep their full name.
pub fn method_title(group_title: &str, method_name: &str) -> String {
    let prefix = group_title.split('(').next().unwrap_or(group_title);
    match method_name.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && rest.starts_with(|c: char| c.is_ascii_uppercase()) => {
            let mut chars = rest.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => method_name.to_string(),
            }
        }
        _ => method_name.to_string(),
    }
}

/// Adapter class for a callback type: `<Callback>Adapter`, or the callback name
/// with its trailing `Listener` replaced by `Adapter`. The candidate must be a
/// class supplying a concrete body for every callback method, either itself or
/// through its superclasses.
pub fn find_adapter<'r, R: TypeResolver + ?Sized>(
    resolver: &'r R,
    callback: &TypeDecl,
    methods: &[CallbackMethodSpec],
) -> Option<&'r TypeDecl> {
    let mut names = vec![format!("{}Adapter", callback.name)];
    if let Some(stem) = callback.name.strip_suffix("Listener") {
        names.push(format!("{}Adapter", stem));
    }
    // siblings of the callback declaration first
    let scope = callback
        .qualified
        .strip_suffix(callback.name.as_str())
        .unwrap_or("");

    for name in names {
        let candidate = resolver
            .resolve(&format!("{}{}", scope, name))
            .or_else(|| resolver.resolve(&name));
        let Some(adapter) = candidate else {
            continue;
        };
        if !adapter.is_class() || adapter.qualified == callback.qualified {
            continue;
        }
        if implements_all(resolver, adapter, methods) {
            return Some(adapter);
        }
        tracing::debug!(
            "{} does not implement every method of {}",
            adapter.qualified,
            callback.qualified
        );
    }
    None
}

fn implements_all<R: TypeResolver + ?Sized>(
    resolver: &R,
    adapter: &TypeDecl,
    methods: &[CallbackMethodSpec],
) -> bool {
    let mut concrete: HashSet<(String, usize)> = HashSet::new();
    let chain = std::iter::once(adapter).chain(crate::types::ancestors(resolver, adapter));
    for decl in chain.filter(|d| d.is_class()) {
        for method in decl.methods.iter().filter(|m| !m.is_abstract) {
            concrete.insert((method.name.clone(), method.params.len()));
        }
    }
    methods
        .iter()
        .all(|m| concrete.contains(&(m.name.clone(), m.arity())))
}

/// Reference to the adapter as it should be instantiated for `callback`:
/// generic adapters take the callback's type arguments.
pub fn adapter_reference(adapter: &TypeDecl, callback: &TypeRef) -> TypeRef {
    if !adapter.type_params.is_empty() && adapter.type_params.len() == callback.args().len() {
        TypeRef::generic(adapter.qualified.clone(), callback.args().to_vec())
    } else {
        TypeRef::named(adapter.qualified.clone())
    }
}
