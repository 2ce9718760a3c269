//! The render run: load, then compose, bind and name each unit, then aggregate.
//!
//! The run is strictly sequential. Every artifact is persisted as soon as it
//! is named, and the aggregator is written last, so its presence marks a
//! completed run. The output directory is assumed to be owned by this run;
//! concurrent runs against the same directory may interleave writes.
use crate::aggregate::{aggregate, Kustomization, AGGREGATOR_FILE_NAME};
use crate::binder::TemplateSet;
use crate::context::{compose, plan_units, RenderUnit};
use crate::error::{RenderError, Result};
use crate::naming::ProducedNames;
use crate::staging::{ensure_output_dir, write_artifact};
use crate::values::{self, Environment, ValueTree};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub environment: Environment,
    pub values_dir: PathBuf,
    /// `None` selects the embedded templates.
    pub templates_dir: Option<PathBuf>,
}

/// Rendered text of one unit with its output name and target directory.
#[derive(Debug)]
pub struct RenderedArtifact<'a> {
    pub unit: &'a RenderUnit,
    pub name: &'a str,
    pub dir: &'a Path,
    pub text: &'a str,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub environment: String,
    pub output_dir: PathBuf,
    pub artifacts: Vec<String>,
    pub aggregator: PathBuf,
}

/// Artifact a run would produce, without writing it.
#[derive(Debug, Serialize)]
pub struct PlannedArtifact {
    pub unit: String,
    pub template: String,
    pub name: String,
    pub bytes: usize,
}

/// Load the template set selected by `options`.
pub fn load_templates(options: &RunOptions) -> Result<TemplateSet> {
    match &options.templates_dir {
        Some(dir) => TemplateSet::from_dir(dir),
        None => TemplateSet::embedded(),
    }
}

/// Directory a run for `environment` writes into.
pub fn environment_dir(output_dir: &Path, environment: Environment) -> PathBuf {
    output_dir.join(environment.as_str())
}

/// Bind every planned unit in order, handing each artifact to `emit`.
///
/// Returns the produced names in production order. Stops at the first
/// failure; artifacts already emitted are not revisited.
pub fn render_units<F>(
    tree: &ValueTree,
    templates: &TemplateSet,
    dir: &Path,
    mut emit: F,
) -> Result<Vec<String>>
where
    F: FnMut(&RenderedArtifact<'_>) -> Result<()>,
{
    let mut produced = ProducedNames::new();
    for unit in plan_units(tree) {
        let context = compose(tree, &unit)?;
        tracing::debug!(unit = %unit, keys = context.len(), "composed context");
        let text = templates.bind(&unit, &context)?;
        let name = produced.claim(&unit)?;
        emit(&RenderedArtifact {
            unit: &unit,
            name: &name,
            dir,
            text: &text,
        })?;
    }
    tracing::debug!(artifacts = produced.names().len(), "all units bound");
    Ok(produced.into_names())
}

/// Run the full pipeline and write into `<output_dir>/<environment>/`.
pub fn run(options: &RunOptions, output_dir: &Path) -> Result<RunReport> {
    let tree = values::load(&options.values_dir, options.environment)?;
    let templates = load_templates(options)?;
    let dir = environment_dir(output_dir, options.environment);
    ensure_output_dir(&dir)?;
    tracing::info!(environment = %options.environment, dir = %dir.display(), "rendering manifests");

    let artifacts = render_units(&tree, &templates, &dir, |artifact| {
        let path = write_artifact(artifact.dir, artifact.name, artifact.text)?;
        tracing::info!(
            unit = %artifact.unit,
            template = %artifact.unit.template,
            path = %path.display(),
            "rendered"
        );
        Ok(())
    })?;

    let manifest = aggregate(&artifacts);
    let aggregator = write_aggregator(&dir, &manifest)?;
    tracing::info!(
        artifacts = artifacts.len(),
        path = %aggregator.display(),
        "wrote aggregator"
    );

    Ok(RunReport {
        environment: options.environment.as_str().to_string(),
        output_dir: dir,
        artifacts,
        aggregator,
    })
}

/// Run load, compose, bind and naming without touching the filesystem.
pub fn plan(options: &RunOptions) -> Result<Vec<PlannedArtifact>> {
    let tree = values::load(&options.values_dir, options.environment)?;
    let templates = load_templates(options)?;
    let mut planned = Vec::new();
    render_units(&tree, &templates, Path::new(""), |artifact| {
        planned.push(PlannedArtifact {
            unit: artifact.unit.label(),
            template: artifact.unit.template.clone(),
            name: artifact.name.to_string(),
            bytes: artifact.text.len(),
        });
        Ok(())
    })?;
    Ok(planned)
}

fn write_aggregator(dir: &Path, manifest: &Kustomization) -> Result<PathBuf> {
    let text = manifest
        .to_yaml()
        .map_err(|err| RenderError::RenderFailure {
            unit: "aggregator".to_string(),
            template: AGGREGATOR_FILE_NAME.to_string(),
            reason: err.to_string(),
        })?;
    write_artifact(dir, AGGREGATOR_FILE_NAME, &text)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
