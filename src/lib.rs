//! Eventwire: listener capability model for Java UI source
//!
//! Given the source of a designed UI class, eventwire discovers its
//! components, derives every listener capability each component exposes
//! (from `addXxxListener`-style registration methods on its type and all
//! ancestors, with generic parameters resolved), finds the registrations and
//! callback methods the source already contains, and adds or removes listener
//! code in a way that keeps the rest of the file byte-for-byte intact.
//!
//! The source is parsed with tree-sitter into an owned syntax model. Toolkit
//! declarations (AWT, Swing, java.beans) are bundled; project declarations
//! can be loaded from source directories.
//!
//! # Example
//!
//! ```ignore
//! use eventwire::{EventsDesigner, Scripted};
//!
//! let mut designer = EventsDesigner::with_toolkit(source)?;
//! let location = designer.ensure_method("m_button", "action", "performed")?;
//! println!("handler at line {}", location.line);
//!
//! designer.remove_method("m_button", "action", "performed", &mut Scripted::yes())?;
//! ```

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod designer;
pub mod error;
pub mod java;
pub mod listener_methods;
pub mod model;
pub mod mutator;
pub mod presentation;
pub mod routing;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use catalog::{build_catalog, CapabilityEntry, Catalog, DeclaredBy};
pub use cli::{Cli, Commands, OutputFormat};
pub use components::{Component, Reference};
pub use config::{CodegenConfig, EventwireConfig, ImplementationStyle, InnerPosition, RemovalConfig};
pub use designer::EventsDesigner;
pub use error::{EventwireError, Result};
pub use java::{SourceUnit, Span, Transaction, TypeRef};
pub use listener_methods::CallbackMethodSpec;
pub use model::{ComponentModel, Model};
pub use mutator::{DecisionProvider, MultiUseChoice, Outcome, Recording, Scripted};
pub use presentation::{ComponentEvents, EventsTree, ListenerGroup, Menu, MethodEntry};
pub use routing::RoutingDecision;
pub use scanner::{MethodLocation, RegistrationSite, Shape};
pub use types::{Origin, TypeRegistry, TypeResolver};
