//! Editing session over one Java source file
//!
//! [`EventsDesigner`] owns the current snapshot and its analysis. Every
//! mutation plans one transaction, commits it, reparses and re-analyzes; the
//! previous analysis is never reused.

use crate::config::EventwireConfig;
use crate::error::{EventwireError, Result};
use crate::java::SourceUnit;
use crate::model::Model;
use crate::mutator::{self, DecisionProvider, EditContext, Outcome, Plan};
use crate::presentation::{EventsTree, Menu};
use crate::routing::RoutingDecision;
use crate::scanner::MethodLocation;
use crate::types::{Layered, Origin, TypeRegistry};

pub struct EventsDesigner {
    /// Toolkit and project declarations
    registry: TypeRegistry,
    /// Declarations of the current snapshot
    unit_types: TypeRegistry,
    source: SourceUnit,
    model: Model,
    config: EventwireConfig,
}

impl EventsDesigner {
    pub fn new(text: impl Into<String>, registry: TypeRegistry, config: EventwireConfig) -> Result<Self> {
        let source = SourceUnit::parse(text)?;
        let unit_types = TypeRegistry::from_unit(source.ast(), Origin::Unit);
        let model = {
            let resolver = Layered {
                top: &unit_types,
                base: &registry,
            };
            Model::analyze(&resolver, source.ast())?
        };
        Ok(Self {
            registry,
            unit_types,
            source,
            model,
            config,
        })
    }

    /// Designer over the bundled toolkit only, with default configuration
    pub fn with_toolkit(text: impl Into<String>) -> Result<Self> {
        Self::new(text, TypeRegistry::with_toolkit()?, EventwireConfig::default())
    }

    pub fn text(&self) -> &str {
        self.source.text()
    }

    pub fn source(&self) -> &SourceUnit {
        &self.source
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn config(&self) -> &EventwireConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EventwireConfig {
        &mut self.config
    }

    pub fn events(&self) -> Result<EventsTree> {
        let class = self.model.class(self.source.ast())?;
        Ok(EventsTree::build(&self.model, class))
    }

    pub fn menu(&self, component: &str) -> Result<Menu> {
        let class = self.model.class(self.source.ast())?;
        let tree = EventsTree::build(&self.model, class);
        let events = tree
            .component(component)
            .ok_or_else(|| EventwireError::UnknownComponent {
                name: component.to_string(),
            })?;
        Ok(Menu::build(events, class))
    }

    /// Location of an implemented method, following routing to the stub for
    /// self-implemented listeners
    pub fn locate(&self, component: &str, listener: &str, method: &str) -> Result<Option<MethodLocation>> {
        let model = self.model.component(component)?;
        let entry = model.entry(listener)?;
        let spec = entry
            .method(method)
            .ok_or_else(|| EventwireError::UnknownMethod {
                listener: entry.title.clone(),
                title: method.to_string(),
            })?;
        let Some(site) = model.site(&entry.title) else {
            return Ok(None);
        };
        let class = self.model.class(self.source.ast())?;
        match self.model.routing(class, model, site, &entry.methods) {
            None => Ok(site.location(spec)),
            Some(routing) => Ok(match routing.get(spec) {
                Some(RoutingDecision::RoutedToStub { stub, .. }) => class
                    .find_method(stub, 1)
                    .map(MethodLocation::of)
                    .or(site.location(spec)),
                Some(RoutingDecision::Handler) => site.location(spec),
                _ => None,
            }),
        }
    }

    /// Make sure the component handles `method` of `listener`, generating
    /// whatever is missing. Returns where the handling code is.
    pub fn ensure_method(&mut self, component: &str, listener: &str, method: &str) -> Result<MethodLocation> {
        let plan = self.plan(|ctx| mutator::ensure_method(ctx, component, listener, method))?;
        self.commit(plan, &format!("ensure {}.{}.{}", component, listener, method))?;
        self.locate(component, listener, method)?.ok_or_else(|| {
            EventwireError::edit(format!(
                "{}.{}.{} is still missing after generation",
                component, listener, method
            ))
        })
    }

    pub fn remove_method(
        &mut self,
        component: &str,
        listener: &str,
        method: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<Outcome> {
        let plan = self.plan(|ctx| mutator::remove_method(ctx, decisions, component, listener, method))?;
        self.commit(plan, &format!("remove {}.{}.{}", component, listener, method))
    }

    pub fn remove_listener(
        &mut self,
        component: &str,
        listener: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<Outcome> {
        let plan = self.plan(|ctx| mutator::remove_capability(ctx, decisions, component, listener))?;
        self.commit(plan, &format!("remove {}.{}", component, listener))
    }

    pub fn delete_component(&mut self, component: &str) -> Result<Outcome> {
        let plan = self.plan(|ctx| mutator::delete_component(ctx, component))?;
        self.commit(plan, &format!("delete {}", component))
    }

    fn plan<F>(&self, operation: F) -> Result<Plan>
    where
        F: FnOnce(&EditContext<'_>) -> Result<Plan>,
    {
        let resolver = Layered {
            top: &self.unit_types,
            base: &self.registry,
        };
        let ctx = EditContext {
            resolver: &resolver,
            source: &self.source,
            class: self.model.class(self.source.ast())?,
            model: &self.model,
            config: &self.config,
        };
        operation(&ctx)
    }

    fn commit(&mut self, plan: Plan, operation: &str) -> Result<Outcome> {
        let tx = match plan {
            Plan::Unchanged => return Ok(Outcome::Unchanged),
            Plan::Cancelled => return Ok(Outcome::Cancelled),
            Plan::Edit(tx) => tx,
        };
        let edits = tx.len();
        let source = self.source.apply(tx).inspect_err(|e| {
            tracing::warn!("{} aborted: {}", operation, e);
        })?;
        let unit_types = TypeRegistry::from_unit(source.ast(), Origin::Unit);
        let model = {
            let resolver = Layered {
                top: &unit_types,
                base: &self.registry,
            };
            Model::analyze(&resolver, source.ast())?
        };
        tracing::info!("{}: applied {} edits", operation, edits);
        self.source = source;
        self.unit_types = unit_types;
        self.model = model;
        Ok(Outcome::Applied)
    }
}
