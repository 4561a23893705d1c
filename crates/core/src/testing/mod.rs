//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing packaging runs to be exercised without ffmpeg or git.
//!
//! # Example
//!
//! ```rust,ignore
//! use hlspack_core::testing::{fixtures, MockDeployer, MockEncoder};
//!
//! let encoder = MockEncoder::new();
//! encoder.set_probe_report(fixtures::probe_report(480, 2, 1)).await;
//! encoder.fail_job("audio_und1_1").await;
//!
//! let deployer = MockDeployer::new();
//! // Hand both to a PackageOrchestrator...
//! ```

mod mock_deployer;
mod mock_encoder;

pub use mock_deployer::MockDeployer;
pub use mock_encoder::{MockEncoder, RecordedRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::config::default_video_variants;
    use crate::inventory::{ProbeReport, ProbeStream};
    use crate::quality::ProfileSet;

    /// The built-in 144p..1080p profile ladder.
    pub fn default_profiles() -> ProfileSet {
        ProfileSet::from_variants(&default_video_variants())
    }

    /// A video stream entry with the given dimensions.
    pub fn video_stream(width: u32, height: u32) -> ProbeStream {
        ProbeStream {
            codec_type: "video".to_string(),
            width: Some(width),
            height: Some(height),
            tags: BTreeMap::new(),
        }
    }

    fn track_stream(codec_type: &str, language: Option<&str>, title: Option<&str>) -> ProbeStream {
        let mut tags = BTreeMap::new();
        if let Some(language) = language {
            tags.insert("language".to_string(), language.to_string());
        }
        if let Some(title) = title {
            tags.insert("title".to_string(), title.to_string());
        }
        ProbeStream {
            codec_type: codec_type.to_string(),
            width: None,
            height: None,
            tags,
        }
    }

    /// An audio stream entry with optional language and title tags.
    pub fn audio_stream(language: Option<&str>, title: Option<&str>) -> ProbeStream {
        track_stream("audio", language, title)
    }

    /// A subtitle stream entry with optional language and title tags.
    pub fn subtitle_stream(language: Option<&str>, title: Option<&str>) -> ProbeStream {
        track_stream("subtitle", language, title)
    }

    /// A 16:9 source of the given height with untagged audio and subtitle tracks.
    pub fn probe_report(height: u32, audio_tracks: usize, subtitle_tracks: usize) -> ProbeReport {
        let width = (height * 16 / 9 + 1) & !1;
        let mut streams = vec![video_stream(width, height)];
        streams.extend((0..audio_tracks).map(|_| audio_stream(None, None)));
        streams.extend((0..subtitle_tracks).map(|_| subtitle_stream(None, None)));
        ProbeReport { streams }
    }
}
