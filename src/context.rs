//! Render units and their binding contexts.
//!
//! A run is a fixed sequence of [`RenderUnit`]s: the shared database first,
//! then a deployment and a service per declared service, then the ingress
//! when routing is enabled. Each unit gets its own context built from the
//! [`ValueTree`] immediately before binding.
use crate::error::{RenderError, Result};
use crate::templates::{
    DEPLOYMENT_TEMPLATE, INGRESS_TEMPLATE, POSTGRES_TEMPLATE, SERVICE_TEMPLATE,
};
use crate::values::{ValueTree, ENVIRONMENT_KEY, NAMESPACE_KEY, ROUTING_KEY, SHARED_KEY};
use serde_json::{Map, Value};
use std::fmt;

/// Key under which a service unit's identifier is exposed to templates.
pub const SERVICE_NAME_KEY: &str = "service_name";

/// Variables passed to one template.
pub type BindingContext = Map<String, Value>;

/// What a unit renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Shared,
    /// `key` is the entry under `services:`, `id` the name used for output.
    Service {
        key: String,
        id: String,
    },
    Routing,
}

/// One (template, optional service) pair scheduled for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderUnit {
    pub kind: UnitKind,
    pub template: String,
}

impl RenderUnit {
    pub fn shared(template: &str) -> Self {
        Self {
            kind: UnitKind::Shared,
            template: template.to_string(),
        }
    }

    pub fn service(key: &str, id: &str, template: &str) -> Self {
        Self {
            kind: UnitKind::Service {
                key: key.to_string(),
                id: id.to_string(),
            },
            template: template.to_string(),
        }
    }

    pub fn routing(template: &str) -> Self {
        Self {
            kind: UnitKind::Routing,
            template: template.to_string(),
        }
    }

    /// Service identifier used to prefix output names.
    pub fn service_id(&self) -> Option<&str> {
        match &self.kind {
            UnitKind::Service { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Short label for reports: `postgres`, `service:<id>`, or `ingress`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RenderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            UnitKind::Shared => f.write_str(SHARED_KEY),
            UnitKind::Service { id, .. } => write!(f, "service:{id}"),
            UnitKind::Routing => f.write_str(ROUTING_KEY),
        }
    }
}

/// Identifier for a service entry: its `service_name` when set, else the key.
pub fn service_id(key: &str, service: &Map<String, Value>) -> String {
    service
        .get(SERVICE_NAME_KEY)
        .and_then(Value::as_str)
        .unwrap_or(key)
        .to_string()
}

/// Units to render for `tree`, in production order.
pub fn plan_units(tree: &ValueTree) -> Vec<RenderUnit> {
    let mut units = vec![RenderUnit::shared(POSTGRES_TEMPLATE)];
    for (key, service) in tree.services() {
        let id = service_id(key, service);
        units.push(RenderUnit::service(key, &id, DEPLOYMENT_TEMPLATE));
        units.push(RenderUnit::service(key, &id, SERVICE_TEMPLATE));
    }
    if tree.routing().is_some() {
        units.push(RenderUnit::routing(INGRESS_TEMPLATE));
    } else {
        tracing::debug!("routing disabled; skipping ingress");
    }
    units
}

/// Shallow merge: keys of `top` replace same-named keys of `base` in place,
/// new keys are appended in `top` order. Nested mappings are replaced whole.
pub fn overlay(base: &Map<String, Value>, top: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in top {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Build the binding context for `unit`.
pub fn compose(tree: &ValueTree, unit: &RenderUnit) -> Result<BindingContext> {
    match &unit.kind {
        UnitKind::Shared => Ok(identity_context(tree, [(SHARED_KEY, tree.shared().clone())])),
        UnitKind::Service { key, id } => {
            let service = tree
                .services()
                .find(|(candidate, _)| *candidate == key)
                .map(|(_, service)| service)
                .ok_or_else(|| unbound(unit, &format!("services.{key}")))?;
            // The unit's identifier always names the service, even over a
            // top-level `service_name`.
            let mut context = overlay(tree.globals(), service);
            context.insert(SERVICE_NAME_KEY.to_string(), Value::String(id.clone()));
            Ok(context)
        }
        UnitKind::Routing => {
            let routing = tree.routing().ok_or_else(|| unbound(unit, "ingress.enabled"))?;
            let field = |name: &str| {
                routing
                    .get(name)
                    .cloned()
                    .ok_or_else(|| unbound(unit, &format!("{ROUTING_KEY}.{name}")))
            };
            Ok(identity_context(
                tree,
                [
                    ("ingress_name", field("name")?),
                    ("ingress_host", field("host")?),
                    ("services", field("services")?),
                ],
            ))
        }
    }
}

fn identity_context<const N: usize>(
    tree: &ValueTree,
    extra: [(&str, Value); N],
) -> BindingContext {
    let mut context = Map::new();
    context.insert(
        NAMESPACE_KEY.to_string(),
        Value::String(tree.namespace().to_string()),
    );
    context.insert(
        ENVIRONMENT_KEY.to_string(),
        Value::String(tree.environment().to_string()),
    );
    for (key, value) in extra {
        context.insert(key.to_string(), value);
    }
    context
}

fn unbound(unit: &RenderUnit, key: &str) -> RenderError {
    RenderError::UnboundReference {
        unit: unit.label(),
        template: unit.template.clone(),
        key: key.to_string(),
    }
}
