//! Output file naming and the per-run record of produced names.
use crate::aggregate::AGGREGATOR_FILE_NAME;
use crate::binder::TEMPLATE_EXTENSION;
use crate::context::RenderUnit;
use crate::error::{RenderError, Result};
use std::collections::HashMap;

/// Extension of every rendered manifest.
pub const OUTPUT_EXTENSION: &str = "yaml";

/// Derive the output file name for `template`, prefixed by `service_id`.
///
/// `deployment.hbs` for service `api` becomes `api-deployment.yaml`.
/// Only a trailing `.hbs` marker is swapped; any other name gets `.yaml`
/// appended.
pub fn output_name(template: &str, service_id: Option<&str>) -> String {
    let stem = template
        .strip_suffix(TEMPLATE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(template);
    match service_id {
        Some(id) => format!("{id}-{stem}.{OUTPUT_EXTENSION}"),
        None => format!("{stem}.{OUTPUT_EXTENSION}"),
    }
}

/// Ordered collection of names produced so far in one run.
///
/// This is the single point that both rejects collisions and fixes the
/// order the aggregator lists.
#[derive(Debug, Default)]
pub struct ProducedNames {
    names: Vec<String>,
    owners: HashMap<String, String>,
}

impl ProducedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name `unit`'s output and record it, failing on a repeat.
    pub fn claim(&mut self, unit: &RenderUnit) -> Result<String> {
        let name = output_name(&unit.template, unit.service_id());
        let existing = if name == AGGREGATOR_FILE_NAME {
            Some("the aggregator document".to_string())
        } else {
            self.owners.get(&name).cloned()
        };
        if let Some(existing) = existing {
            return Err(RenderError::OutputCollision {
                unit: unit.label(),
                name,
                existing,
            });
        }
        self.owners
            .insert(name.clone(), format!("unit {} ({})", unit.label(), unit.template));
        self.names.push(name.clone());
        Ok(name)
    }

    /// Names in production order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_extension_marker() {
        assert_eq!(
            output_name("postgres-statefulset.hbs", None),
            "postgres-statefulset.yaml"
        );
        assert_eq!(output_name("notes", None), "notes.yaml");
        assert_eq!(output_name("archive.hbs.bak", None), "archive.hbs.bak.yaml");
    }

    #[test]
    fn prefixes_service_id() {
        assert_eq!(
            output_name("deployment.hbs", Some("api")),
            "api-deployment.yaml"
        );
        assert_eq!(
            output_name("service.hbs", Some("worker")),
            "worker-service.yaml"
        );
    }

    #[test]
    fn shared_templates_are_disambiguated_by_prefix() {
        let mut produced = ProducedNames::new();
        produced
            .claim(&RenderUnit::service("api", "api", "deployment.hbs"))
            .expect("api");
        produced
            .claim(&RenderUnit::service("worker", "worker", "deployment.hbs"))
            .expect("worker");
        assert_eq!(
            produced.names(),
            ["api-deployment.yaml", "worker-deployment.yaml"]
        );
    }

    #[test]
    fn colliding_names_are_rejected() {
        let mut produced = ProducedNames::new();
        produced
            .claim(&RenderUnit::service("api", "web", "deployment.hbs"))
            .expect("first");
        let err = produced
            .claim(&RenderUnit::service("frontend", "web", "deployment.hbs"))
            .expect_err("same derived name");
        match err {
            RenderError::OutputCollision {
                unit,
                name,
                existing,
            } => {
                assert_eq!(unit, "service:web");
                assert_eq!(name, "web-deployment.yaml");
                assert!(existing.contains("deployment.hbs"), "{existing}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(produced.names().len(), 1);
    }

    #[test]
    fn aggregator_name_is_reserved() {
        let mut produced = ProducedNames::new();
        let err = produced
            .claim(&RenderUnit::shared("kustomization.hbs"))
            .expect_err("reserved name");
        assert!(matches!(err, RenderError::OutputCollision { .. }), "{err}");
    }
}
