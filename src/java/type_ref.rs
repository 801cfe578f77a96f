//! Type references as written in source, and after generic substitution

use serde::Serialize;
use std::fmt;

/// Name of the universal top type used for raw, unbounded type arguments
pub const OBJECT: &str = "Object";

/// A reference to a type.
///
/// The parser cannot tell a type variable from a class name, so it always emits
/// [`TypeRef::Named`]; the substitution layer replaces names bound in an
/// environment and marks still-open parameters as [`TypeRef::Var`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Void,
    Primitive { name: String },
    Named { name: String, args: Vec<TypeRef> },
    Var { name: String },
    Array { element: Box<TypeRef> },
    Wildcard { bound: Option<Box<TypeRef>>, upper: bool },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    pub fn object() -> Self {
        Self::named(OBJECT)
    }

    pub fn var(name: impl Into<String>) -> Self {
        TypeRef::Var { name: name.into() }
    }

    /// Name as written (possibly qualified) for named types
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Last segment of the written name: `java.awt.event.KeyEvent` -> `KeyEvent`
    pub fn simple_name(&self) -> Option<&str> {
        self.name().map(|n| n.rsplit('.').next().unwrap_or(n))
    }

    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Same type with its type arguments dropped
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Named { name, .. } => TypeRef::named(name.clone()),
            TypeRef::Array { element } => TypeRef::Array {
                element: Box::new(element.erasure()),
            },
            other => other.clone(),
        }
    }

    /// Erased simple name used when comparing method signatures
    pub fn signature_key(&self) -> String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive { name } => name.clone(),
            TypeRef::Named { .. } => self.simple_name().unwrap_or_default().to_string(),
            TypeRef::Var { name } => name.clone(),
            TypeRef::Array { element } => format!("{}[]", element.signature_key()),
            TypeRef::Wildcard { .. } => "?".to_string(),
        }
    }

    /// Source text using simple names, e.g. `MyEvent<String>`
    pub fn display(&self) -> String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive { name } => name.clone(),
            TypeRef::Named { args, .. } => {
                let base = self.simple_name().unwrap_or_default();
                if args.is_empty() {
                    base.to_string()
                } else {
                    let args: Vec<String> = args.iter().map(TypeRef::display).collect();
                    format!("{}<{}>", base, args.join(", "))
                }
            }
            TypeRef::Var { name } => name.clone(),
            TypeRef::Array { element } => format!("{}[]", element.display()),
            TypeRef::Wildcard { bound, upper } => match bound {
                None => "?".to_string(),
                Some(bound) if *upper => format!("? extends {}", bound.display()),
                Some(bound) => format!("? super {}", bound.display()),
            },
        }
    }

    /// Visit this reference and every nested type argument
    pub fn walk<F: FnMut(&TypeRef)>(&self, visitor: &mut F) {
        visitor(self);
        match self {
            TypeRef::Named { args, .. } => args.iter().for_each(|a| a.walk(visitor)),
            TypeRef::Array { element } => element.walk(visitor),
            TypeRef::Wildcard {
                bound: Some(bound), ..
            } => bound.walk(visitor),
            _ => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
