//! Read-only views for a hosting editor
//!
//! The events tree lists, per component, every listener group with its method
//! entries and short value summaries. Menus list the same capabilities as
//! commands, split into the component's own and inherited capabilities.
//! Both serialize to JSON.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::{CapabilityEntry, DeclaredBy};
use crate::components::constructor;
use crate::java::ast::TypeDeclaration;
use crate::listener_methods::CallbackMethodSpec;
use crate::model::{ComponentModel, Model};
use crate::routing::{Routing, RoutingDecision};
use crate::scanner::{RegistrationSite, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Normal,
    /// Deprecated capabilities
    Advanced,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodEntry {
    pub title: String,
    pub name: String,
    /// `line N` of the code handling the event, absent otherwise
    pub value_summary: Option<String>,
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingDecision>,
}

impl MethodEntry {
    pub fn is_present(&self) -> bool {
        self.line.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenerGroup {
    pub title: String,
    pub registration: String,
    pub callback: String,
    pub is_modified: bool,
    /// `[pressed, released]`, or `[]` when nothing is implemented
    pub value_summary: String,
    pub shape: Option<Shape>,
    pub deprecated: bool,
    pub category: Category,
    pub declared_by: DeclaredBy,
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentEvents {
    pub name: String,
    pub type_name: String,
    /// Titles of the registered listener groups, absent when there are none
    pub events_summary: Option<String>,
    pub groups: Vec<ListenerGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsTree {
    pub class_name: String,
    pub components: Vec<ComponentEvents>,
}

impl EventsTree {
    pub fn build(model: &Model, class: &TypeDeclaration) -> Self {
        Self {
            class_name: model.class_name.clone(),
            components: model
                .components
                .iter()
                .map(|c| component_events(model, class, c))
                .collect(),
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentEvents> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Indented text listing; `all` includes unregistered groups
    pub fn render_text(&self, all: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.class_name);
        for component in &self.components {
            let _ = writeln!(
                out,
                "  {} : {}  {}",
                component.name,
                component.type_name,
                component.events_summary.as_deref().unwrap_or("")
            );
            for group in component.groups.iter().filter(|g| all || g.is_modified) {
                let marker = if group.deprecated { " (deprecated)" } else { "" };
                let _ = writeln!(out, "    {} {}{}", group.title, group.value_summary, marker);
                for method in &group.methods {
                    let _ = writeln!(
                        out,
                        "      {} {}",
                        method.title,
                        method.value_summary.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        out
    }
}

impl ListenerGroup {
    pub fn method(&self, title: &str) -> Option<&MethodEntry> {
        self.methods.iter().find(|m| m.title == title)
    }
}

impl ComponentEvents {
    pub fn group(&self, title: &str) -> Option<&ListenerGroup> {
        self.groups.iter().find(|g| g.title == title)
    }
}

fn component_events(model: &Model, class: &TypeDeclaration, component: &ComponentModel) -> ComponentEvents {
    let groups: Vec<ListenerGroup> = component
        .component
        .catalog
        .iter()
        .map(|entry| listener_group(model, class, component, entry))
        .collect();
    let registered: Vec<&str> = groups
        .iter()
        .filter(|g| g.is_modified)
        .map(|g| g.title.as_str())
        .collect();
    ComponentEvents {
        name: component.component.name.clone(),
        type_name: component.component.ty.display(),
        events_summary: (!registered.is_empty()).then(|| format!("[{}]", registered.join(", "))),
        groups,
    }
}

fn listener_group(
    model: &Model,
    class: &TypeDeclaration,
    component: &ComponentModel,
    entry: &CapabilityEntry,
) -> ListenerGroup {
    let site = component.site(&entry.title);
    let routing = site.and_then(|s| model.routing(class, component, s, &entry.methods));
    let methods: Vec<MethodEntry> = entry
        .methods
        .iter()
        .map(|spec| {
            let (line, decision) = method_line(class, site, routing.as_ref(), spec);
            MethodEntry {
                title: spec.title.clone(),
                name: spec.name.clone(),
                value_summary: line.map(|l| format!("line {}", l)),
                line,
                routing: decision,
            }
        })
        .collect();
    let present: Vec<&str> = methods
        .iter()
        .filter(|m| m.is_present())
        .map(|m| m.title.as_str())
        .collect();
    ListenerGroup {
        title: entry.title.clone(),
        registration: entry.registration_name.clone(),
        callback: entry.callback_type.display(),
        is_modified: site.is_some(),
        value_summary: format!("[{}]", present.join(", ")),
        shape: site.map(|s| s.shape),
        deprecated: entry.deprecated,
        category: if entry.deprecated {
            Category::Advanced
        } else {
            Category::Normal
        },
        declared_by: entry.declared_by,
        methods,
    }
}

/// Line of the code handling `spec`: the method itself, or the stub a
/// routing guard forwards to
fn method_line(
    class: &TypeDeclaration,
    site: Option<&RegistrationSite>,
    routing: Option<&Routing>,
    spec: &CallbackMethodSpec,
) -> (Option<usize>, Option<RoutingDecision>) {
    let Some(site) = site else {
        return (None, None);
    };
    let location = site.location(spec);
    match routing.and_then(|r| r.get(spec)) {
        None => (location.map(|l| l.line), None),
        Some(decision) => {
            let line = match decision {
                RoutingDecision::NotPresent => None,
                RoutingDecision::Handler => location.map(|l| l.line),
                RoutingDecision::RoutedToStub { stub, .. } => class
                    .find_method(stub, 1)
                    .map(|m| m.line)
                    .or(location.map(|l| l.line)),
            };
            (line, Some(decision.clone()))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub label: String,
    pub method: String,
    pub icon_class: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuGroup {
    pub title: String,
    pub icon_class: &'static str,
    pub category: Category,
    pub items: Vec<MenuItem>,
}

/// Commands for one component, own capabilities first
#[derive(Debug, Clone, Serialize)]
pub struct Menu {
    pub component: String,
    pub own: Vec<MenuGroup>,
    pub ancestor: Vec<MenuGroup>,
}

impl Menu {
    /// Deprecated capabilities only appear once they are registered
    pub fn build(events: &ComponentEvents, class: &TypeDeclaration) -> Self {
        let can_add = constructor(class).is_some();
        let mut own = Vec::new();
        let mut ancestor = Vec::new();
        for group in &events.groups {
            if group.deprecated && !group.is_modified {
                continue;
            }
            let items = group
                .methods
                .iter()
                .map(|m| MenuItem {
                    label: m.title.clone(),
                    method: m.name.clone(),
                    icon_class: if m.is_present() { "method-existing" } else { "method" },
                    enabled: m.is_present() || can_add,
                })
                .collect();
            let menu_group = MenuGroup {
                title: group.title.clone(),
                icon_class: if group.is_modified { "listener-existing" } else { "listener" },
                category: group.category,
                items,
            };
            match group.declared_by {
                DeclaredBy::Own => own.push(menu_group),
                DeclaredBy::Ancestor => ancestor.push(menu_group),
            }
        }
        Self {
            component: events.name.clone(),
            own,
            ancestor,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (heading, groups) in [("own", &self.own), ("ancestor", &self.ancestor)] {
            if groups.is_empty() {
                continue;
            }
            let _ = writeln!(out, "[{}]", heading);
            for group in groups {
                let _ = writeln!(out, "  {} ({})", group.title, group.icon_class);
                for item in &group.items {
                    let state = if item.enabled { "" } else { " [disabled]" };
                    let _ = writeln!(out, "    {} ({}){}", item.label, item.icon_class, state);
                }
            }
        }
        out
    }
}
