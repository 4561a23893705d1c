//! Types for the package orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::builder::{
    BuiltAudioRendition, BuiltSubtitleRendition, BuiltVideoRendition, SkippedRendition,
};
use crate::deploy::DeploymentResult;
use crate::planner::QualityRequest;

/// A working stage of a packaging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStage {
    Probing,
    Planning,
    BuildingVideo,
    BuildingAudio,
    BuildingSubtitles,
    Composing,
}

impl PackageStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probing => "probing",
            Self::Planning => "planning",
            Self::BuildingVideo => "building_video",
            Self::BuildingAudio => "building_audio",
            Self::BuildingSubtitles => "building_subtitles",
            Self::Composing => "composing",
        }
    }
}

impl fmt::Display for PackageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a packaging run.
///
/// ```text
/// Pending -> Probing -> Planning -> BuildingVideo -> BuildingAudio
///         -> BuildingSubtitles -> Composing -> Done
/// ```
///
/// `Failed` is entered from probing, planning, video building or composing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PackageState {
    Pending,
    Running { stage: PackageStage },
    Done,
    Failed { stage: PackageStage, reason: String },
}

impl PackageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }

    /// The stage the run is in, or failed in.
    pub fn stage(&self) -> Option<PackageStage> {
        match self {
            Self::Running { stage } | Self::Failed { stage, .. } => Some(*stage),
            Self::Pending | Self::Done => None,
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Running { stage } => write!(f, "{}", stage),
            Self::Done => f.write_str("done"),
            Self::Failed { stage, .. } => write!(f, "failed during {}", stage),
        }
    }
}

/// What to package, and the per-run overrides of configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub qualities: QualityRequest,
    /// Overrides `packaging.default_segment_duration`.
    pub segment_duration_secs: Option<u32>,
    /// Overrides `packaging.default_preset`.
    pub preset: Option<String>,
    pub generate_thumbnail: bool,
    /// Overrides `packaging.thumbnail_time`.
    pub thumbnail_time: Option<String>,
    pub deploy: bool,
}

impl PackageRequest {
    /// All qualities, configured defaults, a thumbnail, no deployment.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            qualities: QualityRequest::All,
            segment_duration_secs: None,
            preset: None,
            generate_thumbnail: true,
            thumbnail_time: None,
            deploy: false,
        }
    }

    pub fn with_qualities(mut self, qualities: QualityRequest) -> Self {
        self.qualities = qualities;
        self
    }

    pub fn with_segment_duration(mut self, secs: u32) -> Self {
        self.segment_duration_secs = Some(secs);
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_thumbnail(mut self, enabled: bool) -> Self {
        self.generate_thumbnail = enabled;
        self
    }

    pub fn with_deploy(mut self, deploy: bool) -> Self {
        self.deploy = deploy;
        self
    }
}

/// What happened to a requested deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Deployed(DeploymentResult),
    Skipped { reason: String },
    Failed { reason: String },
}

/// Summary of a finished packaging run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub run_id: Uuid,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Every state the run passed through, in order.
    pub states: Vec<PackageState>,
    pub video: Vec<BuiltVideoRendition>,
    pub audio: Vec<BuiltAudioRendition>,
    pub subtitles: Vec<BuiltSubtitleRendition>,
    /// Planned renditions dropped because their build failed.
    pub skipped: Vec<SkippedRendition>,
    pub master_playlist: PathBuf,
    pub thumbnail: Option<PathBuf>,
    pub deployment: Option<DeploymentOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(PackageState::Pending.to_string(), "pending");
        assert_eq!(
            PackageState::Running {
                stage: PackageStage::BuildingVideo
            }
            .to_string(),
            "building_video"
        );
        assert_eq!(
            PackageState::Failed {
                stage: PackageStage::Composing,
                reason: "disk full".to_string()
            }
            .to_string(),
            "failed during composing"
        );
    }

    #[test]
    fn test_state_serialization() {
        let state = PackageState::Running {
            stage: PackageStage::BuildingSubtitles,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"state":"running","stage":"building_subtitles"}"#);
        let parsed: PackageState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_terminal_states() {
        assert!(PackageState::Done.is_terminal());
        assert!(!PackageState::Pending.is_terminal());
        assert!(PackageState::Failed {
            stage: PackageStage::Probing,
            reason: String::new()
        }
        .is_terminal());
        assert_eq!(PackageState::Done.stage(), None);
    }

    #[test]
    fn test_request_defaults() {
        let request = PackageRequest::new("in.mkv", "out");
        assert_eq!(request.qualities, QualityRequest::All);
        assert!(request.generate_thumbnail);
        assert!(!request.deploy);
        assert!(request.segment_duration_secs.is_none());
    }
}
