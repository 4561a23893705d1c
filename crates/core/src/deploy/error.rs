//! Error types for the deploy module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing a package.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Required settings were not provided.
    #[error("Deployment skipped: missing {}", missing.join(", "))]
    MissingCredentials { missing: Vec<String> },

    /// Git binary not found.
    #[error("git not found in PATH")]
    GitNotFound,

    /// Package directory does not exist.
    #[error("Package directory not found: {path}")]
    PackageNotFound { path: PathBuf },

    /// Preparing the staging tree failed.
    #[error("Failed to stage {path}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external command failed.
    #[error("{command} failed: {reason}")]
    CommandFailed {
        command: String,
        reason: String,
        stderr: Option<String>,
    },

    /// I/O error during deployment.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    pub fn command_failed(
        command: impl Into<String>,
        reason: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.into(),
            stderr,
        }
    }

    pub fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }

    /// Whether the deployment was never attempted for lack of settings.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::MissingCredentials { .. })
    }
}
