//! Filesystem writes for rendered artifacts.
//!
//! Each file is written to a temporary sibling and renamed into place, so a
//! reader never observes a half-written manifest. Nothing is rolled back on
//! failure: files already published stay on disk.
use crate::error::{RenderError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Create `dir` and its parents when absent.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| RenderError::WriteFailure {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `text` to `dir/name`, replacing any existing file.
pub fn write_artifact(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    let dest = dir.join(name);
    let failure = |source: std::io::Error| RenderError::WriteFailure {
        path: dest.clone(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(failure)?;
    tmp.write_all(text.as_bytes()).map_err(failure)?;
    tmp.as_file().sync_all().map_err(failure)?;
    tmp.persist(&dest).map_err(|err| failure(err.error))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_output_dir_creates_parents() {
        let root = tempfile::tempdir().expect("create temp dir");
        let dir = root.path().join("rendered").join("dev");
        ensure_output_dir(&dir).expect("create dirs");
        assert!(dir.is_dir());
        ensure_output_dir(&dir).expect("existing dir is fine");
    }

    #[test]
    fn write_artifact_replaces_existing_content() {
        let root = tempfile::tempdir().expect("create temp dir");
        let first = write_artifact(root.path(), "api-service.yaml", "a: 1\n").expect("write");
        let second = write_artifact(root.path(), "api-service.yaml", "a: 2\n").expect("rewrite");
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).expect("read"), "a: 2\n");
        let entries = std::fs::read_dir(root.path()).expect("list").count();
        assert_eq!(entries, 1, "temporary files must not be left behind");
    }

    #[test]
    fn write_into_missing_dir_is_write_failure() {
        let root = tempfile::tempdir().expect("create temp dir");
        let missing = root.path().join("absent");
        let err = write_artifact(&missing, "x.yaml", "x").expect_err("no dir");
        match err {
            RenderError::WriteFailure { path, .. } => assert_eq!(path, missing.join("x.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
