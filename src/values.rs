//! Per-environment values documents.
//!
//! One YAML document per environment is read once per run and frozen into a
//! [`ValueTree`]. Shape checks happen here so later stages can index the
//! required keys without re-validating.
use crate::context::SERVICE_NAME_KEY;
use crate::error::{RenderError, Result};
use clap::ValueEnum;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key holding the namespace identifier.
pub const NAMESPACE_KEY: &str = "namespace";
/// Key holding the environment identifier.
pub const ENVIRONMENT_KEY: &str = "environment";
/// Key holding the shared resource (database) sub-mapping.
pub const SHARED_KEY: &str = "postgres";
/// Key holding the ordered service sub-mappings.
pub const SERVICES_KEY: &str = "services";
/// Key holding the optional routing sub-mapping.
pub const ROUTING_KEY: &str = "ingress";

/// Deployment targets accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed values document for one environment.
///
/// The tree is never mutated after [`load`]; composition copies out of it.
#[derive(Debug, Clone)]
pub struct ValueTree {
    root: Map<String, Value>,
}

impl ValueTree {
    /// Build a tree from an already-parsed mapping, enforcing the document shape.
    pub fn from_mapping(root: Map<String, Value>) -> std::result::Result<Self, String> {
        for key in [NAMESPACE_KEY, ENVIRONMENT_KEY] {
            match root.get(key) {
                Some(Value::String(_)) => {}
                Some(_) => return Err(format!("top-level key {key:?} must be a string")),
                None => return Err(format!("missing required top-level key {key:?}")),
            }
        }
        match root.get(SHARED_KEY) {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(format!("top-level key {SHARED_KEY:?} must be a mapping")),
            None => return Err(format!("missing required top-level key {SHARED_KEY:?}")),
        }
        match root.get(SERVICES_KEY) {
            Some(Value::Object(services)) => {
                for (key, service) in services {
                    let Some(service) = service.as_object() else {
                        return Err(format!("service {key:?} must be a mapping"));
                    };
                    let id = match service.get(SERVICE_NAME_KEY) {
                        None => key.as_str(),
                        Some(Value::String(name)) => name.as_str(),
                        Some(_) => {
                            return Err(format!(
                                "service {key:?}: {SERVICE_NAME_KEY:?} must be a string"
                            ))
                        }
                    };
                    check_service_id(id).map_err(|reason| format!("service {key:?}: {reason}"))?;
                }
            }
            Some(_) => return Err(format!("top-level key {SERVICES_KEY:?} must be a mapping")),
            None => return Err(format!("missing required top-level key {SERVICES_KEY:?}")),
        }
        match root.get(ROUTING_KEY) {
            None | Some(Value::Object(_)) => {}
            Some(_) => return Err(format!("top-level key {ROUTING_KEY:?} must be a mapping")),
        }
        Ok(Self { root })
    }

    /// Full top-level mapping, in document order.
    pub fn globals(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn namespace(&self) -> &str {
        self.root
            .get(NAMESPACE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn environment(&self) -> &str {
        self.root
            .get(ENVIRONMENT_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Shared resource sub-mapping.
    pub fn shared(&self) -> &Value {
        &self.root[SHARED_KEY]
    }

    /// Service sub-mappings in declared order.
    pub fn services(&self) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
        self.root
            .get(SERVICES_KEY)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|services| services.iter())
            .filter_map(|(key, value)| value.as_object().map(|service| (key, service)))
    }

    pub fn service_count(&self) -> usize {
        self.services().count()
    }

    /// Routing sub-mapping, only when present with `enabled: true`.
    pub fn routing(&self) -> Option<&Map<String, Value>> {
        let routing = self.root.get(ROUTING_KEY)?.as_object()?;
        match routing.get("enabled") {
            Some(Value::Bool(true)) => Some(routing),
            _ => None,
        }
    }
}

/// A service identifier becomes a file name prefix, so it must stay a single
/// path component.
fn check_service_id(id: &str) -> std::result::Result<(), String> {
    if id.is_empty() {
        return Err("service identifier is empty".to_string());
    }
    if id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(format!("service identifier {id:?} is not a plain file name"));
    }
    Ok(())
}

/// Path of the values document for `environment` under `values_dir`.
pub fn values_path(values_dir: &Path, environment: Environment) -> PathBuf {
    values_dir.join(format!("{}.yaml", environment.as_str()))
}

/// Read and validate the values document for `environment`.
pub fn load(values_dir: &Path, environment: Environment) -> Result<ValueTree> {
    let path = values_path(values_dir, environment);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(RenderError::ConfigNotFound { path });
        }
        Err(err) => {
            return Err(RenderError::ConfigMalformed {
                path,
                reason: err.to_string(),
            });
        }
    };
    let tree = parse(&text).map_err(|reason| RenderError::ConfigMalformed {
        path: path.clone(),
        reason,
    })?;
    if tree.environment() != environment.as_str() {
        tracing::warn!(
            selected = environment.as_str(),
            document = tree.environment(),
            path = %path.display(),
            "values document declares a different environment"
        );
    }
    tracing::debug!(
        path = %path.display(),
        services = tree.service_count(),
        routing = tree.routing().is_some(),
        "loaded values"
    );
    Ok(tree)
}

/// Parse YAML text into a validated tree.
pub fn parse(text: &str) -> std::result::Result<ValueTree, String> {
    // serde_yaml's own Value rejects duplicate mapping keys.
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|err| err.to_string())?;
    let value: Value = serde_yaml::from_value(yaml).map_err(|err| err.to_string())?;
    match value {
        Value::Object(root) => ValueTree::from_mapping(root),
        Value::Null => Err("document is empty".to_string()),
        _ => Err("top level must be a mapping".to_string()),
    }
}

#[cfg(test)]
#[path = "values_tests.rs"]
mod tests;
