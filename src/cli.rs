//! CLI argument parsing for the render workflow.
use crate::values::Environment;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default location of the per-environment values documents.
pub const DEFAULT_VALUES_DIR: &str = "kubernetes/values";
/// Default root for rendered manifests.
pub const DEFAULT_OUTPUT_DIR: &str = "kubernetes/rendered";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "mrender",
    version,
    about = "Render Kubernetes manifests from per-environment values",
    after_help = "Examples:\n  mrender render --environment dev\n  mrender render -e prod -o out/manifests\n  mrender plan -e staging --json\n  mrender templates",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Render(RenderArgs),
    Plan(PlanArgs),
    Templates(TemplatesArgs),
}

/// Inputs shared by every command that loads values and templates.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Environment to render manifests for
    #[arg(long, short = 'e', value_enum)]
    pub environment: Environment,

    /// Directory holding <environment>.yaml values documents
    #[arg(
        long,
        value_name = "DIR",
        env = "MRENDER_VALUES_DIR",
        default_value = DEFAULT_VALUES_DIR
    )]
    pub values_dir: PathBuf,

    /// Directory of *.hbs templates replacing the built-in set
    #[arg(long, value_name = "DIR", env = "MRENDER_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,
}

/// Render command inputs.
#[derive(Parser, Debug)]
#[command(about = "Render manifests and kustomization.yaml for one environment")]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output root; manifests land in <DIR>/<environment>/
    #[arg(
        long,
        short = 'o',
        value_name = "DIR",
        env = "MRENDER_OUTPUT_DIR",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,
}

/// Plan command inputs.
#[derive(Parser, Debug)]
#[command(about = "Bind every template and list the artifacts without writing them")]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Templates command inputs.
#[derive(Parser, Debug)]
#[command(about = "List the available template identifiers")]
pub struct TemplatesArgs {
    /// Directory of *.hbs templates replacing the built-in set
    #[arg(long, value_name = "DIR", env = "MRENDER_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,
}
