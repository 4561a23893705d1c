//! Types for the rendition planner.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inventory::SourceTrack;
use crate::quality::QualityProfile;

/// Which video qualities the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRequest {
    /// Every known profile.
    #[default]
    All,
    /// Specific profile names, in the order given.
    Named(Vec<String>),
}

impl QualityRequest {
    /// Parses a comma-separated list such as `"1080p, 720p"`.
    ///
    /// `None`, an empty list, or `all` selects every profile.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::All;
        };
        if value.trim().eq_ignore_ascii_case("all") {
            return Self::All;
        }

        let names: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            Self::All
        } else {
            Self::Named(names)
        }
    }
}

impl fmt::Display for QualityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(names) => f.write_str(&names.join(",")),
        }
    }
}

/// A video rendition that has been planned but not built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedVideoRendition {
    pub profile: QualityProfile,
}

impl PlannedVideoRendition {
    /// Directory name of the rendition inside the package.
    pub fn dir_name(&self) -> String {
        format!("video_{}", self.profile.name)
    }
}

/// An audio track that has been planned but not built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAudioRendition {
    pub track: SourceTrack,
}

impl PlannedAudioRendition {
    pub fn dir_name(&self) -> String {
        format!("audio_{}_{}", self.track.language, self.track.index)
    }
}

/// A subtitle track that has been planned but not extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSubtitleRendition {
    pub track: SourceTrack,
}

impl PlannedSubtitleRendition {
    pub fn dir_name(&self) -> String {
        format!("sub_{}_{}", self.track.language, self.track.index)
    }

    pub fn file_name(&self) -> String {
        format!("subtitles_{}_{}.vtt", self.track.language, self.track.index)
    }
}
