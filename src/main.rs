use clap::Parser;
use std::process::ExitCode;

mod aggregate;
mod binder;
mod cli;
mod context;
mod error;
mod logging;
mod naming;
mod pipeline;
mod staging;
mod templates;
mod values;
mod workflow;

use cli::{Command, RootArgs};
use error::RenderError;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    logging::init(args.verbose, args.log_json);

    let result = match args.command {
        Command::Render(args) => workflow::run_render(args),
        Command::Plan(args) => workflow::run_plan(args),
        Command::Templates(args) => workflow::run_templates(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(failure) = err.downcast_ref::<RenderError>() {
                tracing::debug!(code = failure.code(), "run failed");
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
