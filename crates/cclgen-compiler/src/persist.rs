/// Writing manifests under `<project_dir>/<component>/`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CompileError, Result};

/// How an existing file at the target path is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Always replace the file
    Overwrite,
    /// Leave the file (and its modification time) alone when contents match
    IfChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Path of `file_name` inside the component directory.
pub fn manifest_path(project_dir: &Path, component: &str, file_name: &str) -> PathBuf {
    project_dir.join(component).join(file_name)
}

/// Create the component directory if needed and write `text` into it.
pub fn write_manifest(
    project_dir: &Path,
    component: &str,
    file_name: &str,
    text: &str,
    policy: WritePolicy,
) -> Result<(PathBuf, WriteOutcome)> {
    let dir = project_dir.join(component);
    fs::create_dir_all(&dir).map_err(|e| CompileError::persist(&dir, e))?;

    let path = dir.join(file_name);
    if policy == WritePolicy::IfChanged && content_matches(&path, text)? {
        tracing::debug!(path = %path.display(), "unchanged, not rewriting");
        return Ok((path, WriteOutcome::Unchanged));
    }

    fs::write(&path, text).map_err(|e| CompileError::persist(&path, e))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote manifest");
    Ok((path, WriteOutcome::Written))
}

fn content_matches(path: &Path, text: &str) -> Result<bool> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == text.as_bytes()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CompileError::persist(path, e)),
    }
}
