//! Error types for quality profile values.

use thiserror::Error;

/// Errors raised while parsing bitrates, resolutions, or profile tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualityError {
    /// Bitrate string is not `<n>`, `<n>k`, or `<n>m`.
    #[error("Invalid bitrate: {value:?}")]
    InvalidBitrate { value: String },

    /// Resolution string is not `WIDTHxHEIGHT`.
    #[error("Invalid resolution: {value:?} (expected WIDTHxHEIGHT)")]
    InvalidResolution { value: String },

    /// Profile name cannot be used as a directory component.
    #[error("Invalid profile name: {name:?}")]
    InvalidProfileName { name: String },
}
