//! Tracing setup for `mrender`.
//!
//! Progress events (`rendered`, `wrote aggregator`) go to stderr; stdout
//! carries only the command's own report, which `plan --json` relies on.
//! The final error message is printed by `main`, not logged.
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the subscriber for `--verbose` (debug per unit) and
/// `--log-json`. A `RUST_LOG` filter overrides `--verbose`.
pub fn init(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let json_layer = json.then(|| fmt::layer().with_writer(std::io::stderr).json());
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose)
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .ok();
}
