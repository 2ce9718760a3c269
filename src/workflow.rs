use crate::binder::TemplateSet;
use crate::cli::{PlanArgs, RenderArgs, SourceArgs, TemplatesArgs};
use crate::pipeline::{self, RunOptions};
use anyhow::{Context, Result};
use serde::Serialize;

fn run_options(source: &SourceArgs) -> RunOptions {
    RunOptions {
        environment: source.environment,
        values_dir: source.values_dir.clone(),
        templates_dir: source.templates_dir.clone(),
    }
}

pub fn run_render(args: RenderArgs) -> Result<()> {
    let options = run_options(&args.source);
    let report = pipeline::run(&options, &args.output_dir)
        .with_context(|| format!("render {} manifests", options.environment))?;
    for name in &report.artifacts {
        println!("rendered {}", report.output_dir.join(name).display());
    }
    println!(
        "wrote {} {} manifests; aggregator at {}",
        report.artifacts.len(),
        report.environment,
        report.aggregator.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    environment: &'a str,
    artifacts: Vec<pipeline::PlannedArtifact>,
}

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let options = run_options(&args.source);
    let planned = pipeline::plan(&options)
        .with_context(|| format!("plan {} manifests", options.environment))?;
    if args.json {
        let output = PlanOutput {
            environment: options.environment.as_str(),
            artifacts: planned,
        };
        let text = serde_json::to_string_pretty(&output).context("serialize plan")?;
        println!("{text}");
        return Ok(());
    }
    for item in &planned {
        println!("{}\t{}\t{}", item.name, item.unit, item.template);
    }
    Ok(())
}

pub fn run_templates(args: TemplatesArgs) -> Result<()> {
    let set = match &args.templates_dir {
        Some(dir) => TemplateSet::from_dir(dir)
            .with_context(|| format!("load templates from {}", dir.display()))?,
        None => TemplateSet::embedded().context("load embedded templates")?,
    };
    for id in set.ids() {
        println!("{id}");
    }
    Ok(())
}
