//! Error types for manifest output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing the master playlist.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to write master playlist {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
