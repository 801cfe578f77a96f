//! One analysis pass over a snapshot
//!
//! Components, their catalogs and their registration sites are derived from
//! the parsed unit and the resolver, and thrown away after every edit.

use crate::catalog::CapabilityEntry;
use crate::components::{designed_class, discover, Component};
use crate::error::{EventwireError, Result};
use crate::java::ast::{CompilationUnit, TypeDeclaration};
use crate::listener_methods::CallbackMethodSpec;
use crate::routing::{classify, Routing};
use crate::scanner::{scan, RegistrationSite, ScanResult, Shape};
use crate::types::TypeResolver;

#[derive(Debug, Clone)]
pub struct ComponentModel {
    pub component: Component,
    pub sites: ScanResult,
}

impl ComponentModel {
    pub fn name(&self) -> &str {
        &self.component.name
    }

    pub fn entry(&self, title: &str) -> Result<&CapabilityEntry> {
        self.component
            .catalog
            .find(title)
            .ok_or_else(|| EventwireError::UnknownListener {
                component: self.component.name.clone(),
                title: title.to_string(),
            })
    }

    pub fn site(&self, title: &str) -> Option<&RegistrationSite> {
        self.sites.site(title)
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub class_name: String,
    pub components: Vec<ComponentModel>,
}

impl Model {
    pub fn analyze<R: TypeResolver + ?Sized>(resolver: &R, unit: &CompilationUnit) -> Result<Self> {
        let class = designed_class(unit).ok_or(EventwireError::NoDesignedClass)?;
        let components = discover(resolver, class)
            .into_iter()
            .map(|component| {
                let sites = scan(resolver, unit, class, &component);
                ComponentModel { component, sites }
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            "analyzed {}: {} components, {} registrations",
            class.name,
            components.len(),
            components.iter().map(|c| c.sites.sites.len()).sum::<usize>()
        );
        Ok(Self {
            class_name: class.name.clone(),
            components,
        })
    }

    /// The designed class in `unit`
    pub fn class<'u>(&self, unit: &'u CompilationUnit) -> Result<&'u TypeDeclaration> {
        designed_class(unit)
            .filter(|c| c.name == self.class_name)
            .ok_or(EventwireError::NoDesignedClass)
    }

    pub fn component(&self, name: &str) -> Result<&ComponentModel> {
        self.components
            .iter()
            .find(|c| c.component.name == name)
            .ok_or_else(|| EventwireError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub fn plain_components(&self) -> Vec<Component> {
        self.components.iter().map(|c| c.component.clone()).collect()
    }

    /// Routing decisions of a self-implemented registration
    pub fn routing(
        &self,
        class: &TypeDeclaration,
        component: &ComponentModel,
        site: &RegistrationSite,
        methods: &[CallbackMethodSpec],
    ) -> Option<Routing> {
        if site.shape != Shape::SelfImpl {
            return None;
        }
        let components = self.plain_components();
        Some(classify(class, site, methods, &components, &component.component))
    }
}
