//! Aggregator document listing every artifact of a run.
use serde::{Deserialize, Serialize};

/// File name of the aggregator document inside the environment directory.
pub const AGGREGATOR_FILE_NAME: &str = "kustomization.yaml";
pub const KUSTOMIZE_API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";
pub const KUSTOMIZATION_KIND: &str = "Kustomization";

/// `kustomization.yaml` contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kustomization {
    pub api_version: String,
    pub kind: String,
    pub resources: Vec<String>,
}

/// Build the aggregator for `artifact_names`, keeping their order as given.
pub fn aggregate(artifact_names: &[String]) -> Kustomization {
    Kustomization {
        api_version: KUSTOMIZE_API_VERSION.to_string(),
        kind: KUSTOMIZATION_KIND.to_string(),
        resources: artifact_names.to_vec(),
    }
}

impl Kustomization {
    /// Block-style YAML text of the document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_production_order_without_dedup() {
        let names = vec![
            "postgres-statefulset.yaml".to_string(),
            "b-service.yaml".to_string(),
            "a-service.yaml".to_string(),
            "a-service.yaml".to_string(),
        ];
        let manifest = aggregate(&names);
        assert_eq!(manifest.resources, names);
    }

    #[test]
    fn serializes_as_block_yaml() {
        let manifest = aggregate(&[
            "postgres-statefulset.yaml".to_string(),
            "api-deployment.yaml".to_string(),
        ]);
        let text = manifest.to_yaml().expect("serialize");
        assert_eq!(
            text,
            "apiVersion: kustomize.config.k8s.io/v1beta1\n\
             kind: Kustomization\n\
             resources:\n\
             - postgres-statefulset.yaml\n\
             - api-deployment.yaml\n"
        );
    }
}
