//! Types for the rendition builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::encoder::RenditionKind;
use crate::quality::{Bitrate, QualityProfile};

/// Per-run settings shared by every build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    pub source_path: PathBuf,
    /// Root of the package; rendition directories are created inside it.
    pub package_dir: PathBuf,
    pub segment_duration_secs: u32,
    pub preset: String,
    pub audio_bitrate: Bitrate,
    /// Maximum encoder invocations running at once within a stage.
    pub max_parallel: usize,
}

/// A video rendition whose playlist exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltVideoRendition {
    pub profile: QualityProfile,
    /// Playlist path relative to the package root, `/`-separated.
    pub playlist_path: String,
}

/// An audio rendition whose playlist exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltAudioRendition {
    pub language: String,
    pub name: String,
    pub playlist_path: String,
}

/// A subtitle track extracted to WebVTT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltSubtitleRendition {
    pub language: String,
    pub name: String,
    pub subtitle_path: String,
}

/// A planned rendition that was dropped because its build failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRendition {
    pub kind: RenditionKind,
    /// Rendition directory name, e.g. `sub_fra_1`.
    pub label: String,
    pub reason: String,
}

/// Result of one build request within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackOutcome<T> {
    Built(T),
    Skipped(SkippedRendition),
}

impl<T> TrackOutcome<T> {
    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    pub fn built(&self) -> Option<&T> {
        match self {
            Self::Built(value) => Some(value),
            Self::Skipped(_) => None,
        }
    }
}

/// Splits stage outcomes into built renditions and skipped ones, keeping order.
pub fn partition_outcomes<T>(outcomes: Vec<TrackOutcome<T>>) -> (Vec<T>, Vec<SkippedRendition>) {
    let mut built = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            TrackOutcome::Built(value) => built.push(value),
            TrackOutcome::Skipped(s) => skipped.push(s),
        }
    }
    (built, skipped)
}
