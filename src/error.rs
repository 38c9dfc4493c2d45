//! Error taxonomy for a scaffolding run.
//!
//! Each variant names the resource that failed (table, path, package) so the
//! operator can act on the message alone. Whether a variant is fatal is decided
//! by the orchestrator, not here.

use std::fmt;
use std::path::PathBuf;

/// Errors produced by the scaffolding pipeline and its front door.
#[derive(Debug)]
pub enum ScaffoldError {
    /// Schema or column metadata could not be fetched
    MetadataFetch {
        /// Table name, or `"model list"` for table discovery
        resource: String,
        /// Underlying driver error
        source: anyhow::Error,
    },
    /// A template failed to render
    Render {
        /// Model (or shared artifact) being rendered
        artifact: String,
        /// Underlying template error
        source: askama::Error,
    },
    /// A directory could not be created or a file could not be written
    Write {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The dependency manifest could not be read or the install command failed
    DependencyInstall {
        /// Package being reconciled
        package: String,
        /// Reason
        source: anyhow::Error,
    },
    /// The environment file could not be read, matched or written back
    EnvReconcile {
        /// Environment file path
        path: PathBuf,
        /// Reason
        source: anyhow::Error,
    },
    /// A directory could not be read while reporting the project tree
    DirectoryRead {
        /// Directory that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The project tree could not be written to the report output
    ReportOutput {
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// `tsconfig.json` could not be read, parsed or written
    Tsconfig {
        /// Path to tsconfig.json
        path: PathBuf,
        /// Reason
        source: anyhow::Error,
    },
    /// Configuration file is malformed or a required setting is missing
    Config(String),
    /// A prerequisite directory or package is missing
    Prerequisite(String),
}

impl fmt::Display for ScaffoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldError::MetadataFetch { resource, source } => {
                write!(f, "Failed to fetch metadata for {resource}: {source}")
            }
            ScaffoldError::Render { artifact, source } => {
                write!(f, "Failed to render {artifact}: {source}")
            }
            ScaffoldError::Write { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
            ScaffoldError::DependencyInstall { package, source } => {
                write!(f, "Failed to install package {package}: {source:#}")
            }
            ScaffoldError::EnvReconcile { path, source } => {
                write!(f, "Failed to update env file {}: {source:#}", path.display())
            }
            ScaffoldError::DirectoryRead { path, source } => {
                write!(f, "Failed to read directory {}: {source}", path.display())
            }
            ScaffoldError::ReportOutput { source } => {
                write!(f, "Failed to print project tree: {source}")
            }
            ScaffoldError::Tsconfig { path, source } => {
                write!(f, "Failed to update {}: {source:#}", path.display())
            }
            ScaffoldError::Config(msg) => write!(f, "Configuration error: {msg}"),
            ScaffoldError::Prerequisite(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ScaffoldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaffoldError::MetadataFetch { source, .. }
            | ScaffoldError::DependencyInstall { source, .. }
            | ScaffoldError::EnvReconcile { source, .. }
            | ScaffoldError::Tsconfig { source, .. } => Some(&**source),
            ScaffoldError::Render { source, .. } => Some(source),
            ScaffoldError::Write { source, .. }
            | ScaffoldError::ReportOutput { source }
            | ScaffoldError::DirectoryRead { source, .. } => Some(source),
            ScaffoldError::Config(_) | ScaffoldError::Prerequisite(_) => None,
        }
    }
}

/// Result alias used across the crate
pub type ScaffoldResult<T> = Result<T, ScaffoldError>;
