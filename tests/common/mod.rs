//! Shared test infrastructure for integration tests.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()))
}

/// Values documents shipped with the repo.
pub fn shipped_values_dir() -> PathBuf {
    manifest_dir().join("kubernetes/values")
}

/// Scratch directory with its own values and output roots.
pub struct Scratch {
    pub dir: TempDir,
}

impl Scratch {
    pub fn create() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn values_dir(&self) -> PathBuf {
        self.dir.path().join("values")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Write `<values>/<environment>.yaml`.
    pub fn write_values(&self, environment: &str, text: &str) {
        std::fs::create_dir_all(self.values_dir()).expect("create values dir");
        std::fs::write(self.values_dir().join(format!("{environment}.yaml")), text)
            .expect("write values");
    }
}

/// Run the `mrender` binary with a clean `MRENDER_*` environment.
pub fn mrender(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mrender"))
        .args(args)
        .current_dir(cwd)
        .env_remove("MRENDER_VALUES_DIR")
        .env_remove("MRENDER_OUTPUT_DIR")
        .env_remove("MRENDER_TEMPLATES_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("run mrender")
}

/// Sorted file names directly under `dir`.
pub fn listed(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("list dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
