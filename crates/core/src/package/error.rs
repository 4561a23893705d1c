//! Error types for the package orchestrator.

use std::path::PathBuf;
use thiserror::Error;

use crate::builder::SkippedRendition;
use crate::inventory::ProbeError;
use crate::manifest::ManifestError;
use crate::planner::PlanningError;

use super::types::PackageStage;

/// Errors that end a packaging run.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Source file does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The requested segment duration is zero.
    #[error("Segment duration must be at least 1 second")]
    ZeroSegmentDuration,

    /// Output directory could not be created.
    #[error("Failed to create output directory {path}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Every planned video rendition failed to build.
    #[error("All {} video renditions failed to build", failures.len())]
    NoVideoRenditions { failures: Vec<SkippedRendition> },

    #[error(transparent)]
    Write(#[from] ManifestError),
}

impl PackageError {
    /// The stage the run failed in.
    pub fn stage(&self) -> PackageStage {
        match self {
            Self::InputNotFound { .. }
            | Self::ZeroSegmentDuration
            | Self::OutputDirectory { .. }
            | Self::Probe(_) => PackageStage::Probing,
            Self::Planning(_) => PackageStage::Planning,
            Self::NoVideoRenditions { .. } => PackageStage::BuildingVideo,
            Self::Write(_) => PackageStage::Composing,
        }
    }
}
