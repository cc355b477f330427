//! Error types for cb2m-core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for cb2m-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building an artifact.
///
/// Every variant is an infrastructure failure. A compiler run that exits
/// non-zero is not an error; it is reported through
/// [`CompilerResult`](crate::compile::CompilerResult).
#[derive(Debug, Error)]
pub enum Error {
    /// The temp root or a job directory could not be created.
    #[error("could not set up build job at {path}: {message}")]
    JobSetupFailed { path: PathBuf, message: String },

    /// The compiler process could not be started at all.
    #[error("failed to start compiler {program}: {message}")]
    CompilerSpawnFailed { program: PathBuf, message: String },

    /// The compiler did not finish within the configured time.
    #[error("compiler did not finish within {}s", .0.as_secs())]
    CompilerTimeout(Duration),

    /// The output directory could not be turned into an archive.
    #[error("packaging failed: {0}")]
    PackagingFailed(String),

    /// The descriptor template could not be loaded.
    #[error("could not load descriptor template {path}: {message}")]
    TemplateSourceMissing { path: PathBuf, message: String },

    /// No compiler toolchain is available.
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// Invalid operation (e.g., compiling a job twice).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn job_setup(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::JobSetupFailed {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
