//! Failure taxonomy for a render run.
//!
//! Every variant is fatal for the current run. Variants carry the unit and
//! template involved so the report names what failed, not just that
//! something did.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("values document not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("values document {} is malformed: {reason}", path.display())]
    ConfigMalformed { path: PathBuf, reason: String },

    #[error("template {template:?} not found (unit {unit})")]
    TemplateNotFound { unit: String, template: String },

    #[error("template {template:?} is malformed: {reason}")]
    TemplateMalformed { template: String, reason: String },

    #[error("template {template:?} references unbound key {key:?} (unit {unit})")]
    UnboundReference {
        unit: String,
        template: String,
        key: String,
    },

    #[error("render of template {template:?} failed (unit {unit}): {reason}")]
    RenderFailure {
        unit: String,
        template: String,
        reason: String,
    },

    #[error("output name {name:?} from unit {unit} collides with {existing}")]
    OutputCollision {
        unit: String,
        name: String,
        existing: String,
    },

    #[error("write {} failed", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Stable short code used in logs and JSON reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::ConfigMalformed { .. } => "config_malformed",
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::TemplateMalformed { .. } => "template_malformed",
            Self::UnboundReference { .. } => "unbound_reference",
            Self::RenderFailure { .. } => "render_failure",
            Self::OutputCollision { .. } => "output_collision",
            Self::WriteFailure { .. } => "write_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failure_chain_names_the_io_error_once() {
        let err = RenderError::WriteFailure {
            path: PathBuf::from("out/dev/api-service.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.code(), "write_failure");
        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain, "write out/dev/api-service.yaml failed: denied");
    }
}
