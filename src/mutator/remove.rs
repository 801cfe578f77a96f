//! Removal of callback methods and whole registrations

use crate::catalog::CapabilityEntry;
use crate::error::{EventwireError, Result};
use crate::java::ast::{ClassBody, Span};
use crate::java::Transaction;
use crate::listener_methods::CallbackMethodSpec;
use crate::model::ComponentModel;
use crate::routing::{guards, RoutingDecision};
use crate::scanner::{Implementation, RegistrationSite, Shape};

use super::decision::{DecisionProvider, MultiUseChoice};
use super::{
    clear_body, delete_unused_stubs, forwarded_stub, forwarded_stubs, is_body_empty,
    provides_concrete, registrations_of_type, remove_member, remove_type_if_unused,
    type_usages, EditContext, Plan,
};

/// Remove one callback method of a capability.
///
/// Unregistered capabilities and methods that are not implemented leave the
/// source untouched.
pub fn remove_method(
    ctx: &EditContext<'_>,
    decisions: &mut dyn DecisionProvider,
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
    let Some(site) = model.site(&entry.title) else {
        return Ok(Plan::Unchanged);
    };
    if site.shape != Shape::SelfImpl && site.location(spec).is_none() {
        return Ok(Plan::Unchanged);
    }

    match &site.implementation {
        Implementation::SelfImpl => Ok(remove_self_method(ctx, model, entry, site, spec)),
        Implementation::Anonymous { base, body, .. } => {
            if !confirm_removal(ctx, decisions, entry, model.name()) {
                return Ok(Plan::Cancelled);
            }
            let base = ctx.resolver.resolve_ref(base);
            let required = |m: &CallbackMethodSpec| {
                m.is_abstract
                    && !base.is_some_and(|b| provides_concrete(ctx.resolver, b, true, &m.name, m.arity()))
            };
            let mut tx = ctx.source.transaction();
            let mut stubs = Vec::new();
            remove_from_body(ctx, &mut tx, &mut stubs, entry, body, spec, &required, || {
                site.removal_spans()
            });
            delete_unused_stubs(ctx, &mut tx, &stubs);
            Ok(Plan::from_removal(ctx, tx))
        }
        Implementation::Named { type_name, .. } => {
            if !confirm_removal(ctx, decisions, entry, model.name()) {
                return Ok(Plan::Cancelled);
            }
            let usages = type_usages(ctx.class, type_name).len();
            let all_usages = if usages > 1 {
                match decisions.multi_use(type_name, usages) {
                    None | Some(MultiUseChoice::Cancel) => return Ok(Plan::Cancelled),
                    Some(MultiUseChoice::ThisUsageOnly) => {
                        let mut tx = ctx.source.transaction();
                        remove_registration(ctx, &mut tx, site);
                        return Ok(Plan::from_removal(ctx, tx));
                    }
                    Some(MultiUseChoice::AllUsages) => true,
                }
            } else {
                false
            };
            let decl = ctx
                .source
                .ast()
                .find_type(type_name)
                .ok_or_else(|| EventwireError::edit(format!("{} is not declared", type_name)))?;
            let resolved = ctx.resolver.resolve(type_name);
            let required = |m: &CallbackMethodSpec| {
                m.is_abstract
                    && !resolved
                        .is_some_and(|d| provides_concrete(ctx.resolver, d, false, &m.name, m.arity()))
            };
            let mut tx = ctx.source.transaction();
            let mut stubs = Vec::new();
            let emptied = remove_from_body(ctx, &mut tx, &mut stubs, entry, &decl.body, spec, &required, || {
                if all_usages {
                    registrations_of_type(ctx.model, type_name)
                } else {
                    site.removal_spans()
                }
            });
            if emptied {
                remove_type_if_unused(ctx, &mut tx, type_name, &mut stubs);
            }
            delete_unused_stubs(ctx, &mut tx, &stubs);
            Ok(Plan::from_removal(ctx, tx))
        }
    }
}

/// Remove a whole capability registration of a component
pub fn remove_capability(
    ctx: &EditContext<'_>,
    decisions: &mut dyn DecisionProvider,
    component: &str,
    listener: &str,
) -> Result<Plan> {
    let model = ctx.model.component(component)?;
    let entry = model.entry(listener)?;
    let Some(site) = model.site(&entry.title) else {
        return Ok(Plan::Unchanged);
    };

    let mut tx = ctx.source.transaction();
    let mut stubs = Vec::new();
    match &site.implementation {
        Implementation::SelfImpl => {
            remove_registration(ctx, &mut tx, site);
            remove_self_guards(ctx, &mut tx, &mut stubs, model, entry, site);
        }
        Implementation::Anonymous { body, .. } => {
            if !confirm_removal(ctx, decisions, entry, model.name()) {
                return Ok(Plan::Cancelled);
            }
            remove_registration(ctx, &mut tx, site);
            stubs.extend(forwarded_stubs(ctx.class, body));
        }
        Implementation::Named { type_name, .. } => {
            if !confirm_removal(ctx, decisions, entry, model.name()) {
                return Ok(Plan::Cancelled);
            }
            let usages = type_usages(ctx.class, type_name).len();
            if usages > 1 {
                match decisions.multi_use(type_name, usages) {
                    None | Some(MultiUseChoice::Cancel) => return Ok(Plan::Cancelled),
                    Some(MultiUseChoice::ThisUsageOnly) => remove_registration(ctx, &mut tx, site),
                    Some(MultiUseChoice::AllUsages) => {
                        for span in registrations_of_type(ctx.model, type_name) {
                            tx.remove_lines(ctx.text(), span);
                        }
                    }
                }
            } else {
                remove_registration(ctx, &mut tx, site);
            }
            remove_type_if_unused(ctx, &mut tx, type_name, &mut stubs);
        }
    }
    delete_unused_stubs(ctx, &mut tx, &stubs);
    Ok(Plan::from_removal(ctx, tx))
}

fn confirm_removal(
    ctx: &EditContext<'_>,
    decisions: &mut dyn DecisionProvider,
    entry: &CapabilityEntry,
    component: &str,
) -> bool {
    if !ctx.config.removal.confirm {
        return true;
    }
    let confirmed = decisions.confirm(&format!(
        "Remove the {} listener code of {}?",
        entry.title, component
    ));
    if !confirmed {
        tracing::warn!("removal of {} from {} declined", entry.title, component);
    }
    confirmed
}

pub(crate) fn remove_registration(ctx: &EditContext<'_>, tx: &mut Transaction, site: &RegistrationSite) {
    for span in site.removal_spans() {
        tx.remove_lines(ctx.text(), span);
    }
}

/// Remove `spec` from an implementation body. When nothing but required,
/// empty callback methods would remain, the registrations given by
/// `registrations` are removed instead and `true` is returned.
#[allow(clippy::too_many_arguments)]
fn remove_from_body<F, G>(
    ctx: &EditContext<'_>,
    tx: &mut Transaction,
    stubs: &mut Vec<String>,
    entry: &CapabilityEntry,
    body: &ClassBody,
    spec: &CallbackMethodSpec,
    required: &F,
    registrations: G,
) -> bool
where
    F: Fn(&CallbackMethodSpec) -> bool,
    G: FnOnce() -> Vec<Span>,
{
    let text = ctx.text();
    let Some(method) = body.find_method(&spec.name, spec.arity()) else {
        return false;
    };
    stubs.extend(forwarded_stub(ctx.class, method));

    let others_empty = body.fields.is_empty()
        && body.types.is_empty()
        && body
            .methods
            .iter()
            .filter(|m| !(m.name == spec.name && m.params.len() == spec.arity()))
            .all(|m| {
                entry
                    .methods
                    .iter()
                    .find(|c| c.name == m.name && c.arity() == m.params.len())
                    .is_some_and(|c| required(c) && is_body_empty(text, m))
            });

    if others_empty {
        tracing::debug!("{} implementation becomes empty", entry.title);
        for span in registrations() {
            tx.remove_lines(text, span);
        }
        stubs.extend(forwarded_stubs(ctx.class, body));
        true
    } else if required(spec) {
        clear_body(tx, text, method);
        false
    } else {
        remove_member(tx, text, method.extended_span);
        false
    }
}

/// Remove a self-implemented callback method for one component: its routing
/// guard, or the handler body. The method itself stays, the interface still
/// requires it, and so does the registration.
fn remove_self_method(
    ctx: &EditContext<'_>,
    model: &ComponentModel,
    entry: &CapabilityEntry,
    site: &RegistrationSite,
    spec: &CallbackMethodSpec,
) -> Plan {
    let class = ctx.class;
    let text = ctx.text();
    let Some(routing) = ctx.model.routing(class, model, site, &entry.methods) else {
        return Plan::Unchanged;
    };
    let Some(method) = class.find_method(&spec.name, spec.arity()) else {
        return Plan::Unchanged;
    };
    let components = ctx.model.plain_components();
    let mut tx = ctx.source.transaction();
    let mut stubs = Vec::new();

    match routing.get(spec) {
        None | Some(RoutingDecision::NotPresent) => return Plan::Unchanged,
        Some(RoutingDecision::RoutedToStub { guard, stub, .. }) => {
            tx.remove_lines(text, *guard);
            stubs.push(stub.clone());
        }
        Some(RoutingDecision::Handler) => {
            let method_guards = guards(class, method, &components);
            match method_guards.iter().find(|g| g.target == model.component.name) {
                Some(guard) => {
                    tx.remove_lines(text, guard.span());
                    stubs.extend(guard.stub.clone());
                }
                None => {
                    stubs.extend(forwarded_stub(class, method));
                    clear_body(&mut tx, text, method);
                }
            }
        }
    }

    delete_unused_stubs(ctx, &mut tx, &stubs);
    Plan::from_transaction(tx)
}

/// Remove every routing guard serving the component in self-implemented methods
pub(crate) fn remove_self_guards(
    ctx: &EditContext<'_>,
    tx: &mut Transaction,
    stubs: &mut Vec<String>,
    model: &ComponentModel,
    entry: &CapabilityEntry,
    site: &RegistrationSite,
) {
    if model.component.is_root() {
        return;
    }
    let components = ctx.model.plain_components();
    for spec in &entry.methods {
        if site.location(spec).is_none() {
            continue;
        }
        let Some(method) = ctx.class.find_method(&spec.name, spec.arity()) else {
            continue;
        };
        for guard in guards(ctx.class, method, &components) {
            if guard.target == model.component.name {
                tx.remove_lines(ctx.text(), guard.span());
                stubs.extend(guard.stub.clone());
            }
        }
    }
}
