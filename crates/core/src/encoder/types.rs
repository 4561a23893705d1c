//! Types for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::quality::{Bitrate, Resolution};

/// What a single encode request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenditionKind {
    Video,
    Audio,
    Subtitle,
}

impl RenditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
        }
    }
}

/// One encode-and-segment request toward the external encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeRequest {
    /// Identifier used in logs; also the rendition directory name.
    pub job_id: String,
    pub kind: RenditionKind,
    pub source_path: PathBuf,
    /// Rendition directory (absolute or relative to the working directory).
    pub output_dir: PathBuf,
    /// Playlist or subtitle file name inside `output_dir`.
    pub output_file: String,
    /// Input stream selector, e.g. `0:v:0`.
    pub map_selector: String,
    pub codec: String,
    pub bitrate: Option<Bitrate>,
    pub resolution: Option<Resolution>,
    pub segment_duration_secs: u32,
    pub preset: String,
}

impl EncodeRequest {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

/// Result of a successful encode request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeResult {
    pub job_id: String,
    /// Path of the produced playlist or subtitle file.
    pub output_path: PathBuf,
    pub duration_ms: u64,
}

/// Request for a single still frame of the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Seek position, `HH:MM:SS` or seconds.
    pub seek_time: String,
}
