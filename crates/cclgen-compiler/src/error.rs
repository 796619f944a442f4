/// Error types for the manifest compiler

use std::fmt;
use std::path::PathBuf;

use cclgen_registry::RegistryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schedule template for {owner} in bin '{bin}': {reason}")]
    MalformedTemplate { owner: String, bin: String, reason: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Project file error in {file}: {message}")]
    Project { file: PathBuf, message: String },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<CompileError>),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl CompileError {
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Persist {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_template(
        owner: impl Into<String>,
        bin: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CompileError::MalformedTemplate {
            owner: owner.into(),
            bin: bin.into(),
            reason: reason.into(),
        }
    }

    pub fn project(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CompileError::Project {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Advisory finding reported alongside generated output.
///
/// Diagnostics never abort generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A registered unit declares no schedule placements and contributes nothing
    MissingScheduleInfo { unit: String, component: String },
    /// An extra entry carries the unit-name placeholder but names no unit
    UnnamedPlaceholder { bin: String, component: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingScheduleInfo { unit, component } => write!(
                f,
                "No schedule.ccl information included for: {unit} (component {component})"
            ),
            Diagnostic::UnnamedPlaceholder { bin, component } => write!(
                f,
                "Extra schedule entry in bin '{bin}' of {component} has a placeholder \
                 but no unit name; substituting an empty name"
            ),
        }
    }
}
