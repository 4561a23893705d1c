//! Error types for source probing.

use thiserror::Error;

use crate::encoder::EncoderError;

/// Errors raised while building the source inventory.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe tool could not be run or exited unsuccessfully.
    #[error("Probe failed: {0}")]
    Collaborator(#[from] EncoderError),

    /// The probe tool's output is not the expected structured metadata.
    #[error("Unparsable probe output: {reason}")]
    Unparsable { reason: String },
}

impl ProbeError {
    pub fn unparsable(reason: impl Into<String>) -> Self {
        Self::Unparsable {
            reason: reason.into(),
        }
    }
}
