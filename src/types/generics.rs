//! Generic substitution
//!
//! A [`TypeEnv`] maps type parameter names to the types they stand for at one
//! use site. An [`Instantiation`] holds one environment per declaration along a
//! type's supertype closure, computed once by walking from the concrete type up
//! to its distant ancestors. Lookups afterwards are plain map reads.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{TypeDecl, TypeResolver};
use crate::java::ast::TypeParam;
use crate::java::TypeRef;

/// Substitution passes before giving up on a cyclic environment
const MAX_PASSES: usize = 16;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeEnv {
    bindings: HashMap<String, TypeRef>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment in which the given parameters are still open
    pub fn open(params: &[TypeParam]) -> Self {
        let mut env = Self::new();
        for param in params {
            env.bind(&param.name, TypeRef::var(&param.name));
        }
        env
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.bindings.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Substitute bound names until nothing changes
    pub fn apply(&self, ty: &TypeRef) -> TypeRef {
        let mut current = ty.clone();
        for _ in 0..MAX_PASSES {
            let next = self.substitute(&current);
            if next == current {
                return next;
            }
            current = next;
        }
        tracing::debug!("substitution of {} did not settle", ty.display());
        current
    }

    fn substitute(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Named { name, args } if args.is_empty() => match self.bindings.get(name) {
                Some(bound) => bound.clone(),
                None => ty.clone(),
            },
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| self.substitute(a)).collect(),
            },
            TypeRef::Var { name } => match self.bindings.get(name) {
                // an open parameter maps to itself
                Some(TypeRef::Var { name: same }) if same == name => ty.clone(),
                Some(bound) => bound.clone(),
                None => ty.clone(),
            },
            TypeRef::Array { element } => TypeRef::Array {
                element: Box::new(self.substitute(element)),
            },
            TypeRef::Wildcard { bound, upper } => TypeRef::Wildcard {
                bound: bound.as_ref().map(|b| Box::new(self.substitute(b))),
                upper: *upper,
            },
            TypeRef::Void | TypeRef::Primitive { .. } => ty.clone(),
        }
    }

    /// Environment binding `params` to `args` as seen from `outer`.
    ///
    /// A raw use (no arguments) binds every parameter to the erasure of its
    /// bound, or `Object` when unbounded.
    pub fn for_use(params: &[TypeParam], args: &[TypeRef], outer: &TypeEnv) -> Self {
        let mut env = Self::new();
        if args.len() == params.len() {
            for (param, arg) in params.iter().zip(args) {
                env.bind(&param.name, outer.apply(arg));
            }
        } else {
            if !args.is_empty() {
                tracing::debug!(
                    "argument count mismatch ({} for {}), treating use as raw",
                    args.len(),
                    params.len()
                );
            }
            for param in params {
                let erased = param
                    .bound
                    .as_ref()
                    .map(|b| outer.apply(&b.erasure()))
                    .unwrap_or_else(TypeRef::object);
                env.bind(&param.name, erased);
            }
        }
        env
    }
}

/// Per-declaration environments for one instantiated type
#[derive(Debug, Clone, Default)]
pub struct Instantiation {
    /// Qualified names in breadth-first order, the instantiated type first
    order: Vec<String>,
    envs: HashMap<String, TypeEnv>,
}

impl Instantiation {
    /// Walk the supertype closure of `ty`, binding each declaration's
    /// parameters from the arguments written at the use site.
    pub fn of<R: TypeResolver + ?Sized>(resolver: &R, ty: &TypeRef, outer: &TypeEnv) -> Self {
        let mut inst = Self::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(TypeRef, TypeEnv)> = VecDeque::new();
        queue.push_back((ty.clone(), outer.clone()));

        while let Some((use_site, env)) = queue.pop_front() {
            let Some(decl) = resolver.resolve_ref(&use_site) else {
                tracing::debug!("cannot instantiate unresolved type {}", use_site.display());
                continue;
            };
            if !seen.insert(decl.qualified.clone()) {
                continue;
            }
            let decl_env = TypeEnv::for_use(&decl.type_params, use_site.args(), &env);
            for sup in decl.supertypes() {
                queue.push_back((sup.clone(), decl_env.clone()));
            }
            inst.order.push(decl.qualified.clone());
            inst.envs.insert(decl.qualified.clone(), decl_env);
        }
        inst
    }

    /// Environment of the given declaration; empty for unrelated types
    pub fn env_for(&self, decl: &TypeDecl) -> TypeEnv {
        self.envs.get(&decl.qualified).cloned().unwrap_or_default()
    }

    /// Declarations of the closure, the instantiated type first
    pub fn declarations<'r, R: TypeResolver + ?Sized>(&self, resolver: &'r R) -> Vec<&'r TypeDecl> {
        self.order
            .iter()
            .filter_map(|name| resolver.resolve(name))
            .collect()
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.envs.contains_key(qualified)
    }
}
