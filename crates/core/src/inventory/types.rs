//! Types for the stream inventory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quality::Resolution;

use super::error::ProbeError;

/// Structured probe output, shaped like `ffprobe -print_format json -show_streams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

impl ProbeReport {
    /// Parses the JSON document printed by the probe tool.
    pub fn from_json(output: &str) -> Result<Self, ProbeError> {
        serde_json::from_str(output)
            .map_err(|e| ProbeError::unparsable(format!("Failed to parse probe output: {}", e)))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One stream entry of the probe output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub codec_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl ProbeStream {
    /// Looks up a tag, accepting both lower- and upper-case keys.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .or_else(|| self.tags.get(&key.to_ascii_uppercase()))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Kind of a non-video source track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Subtitle,
}

impl TrackKind {
    pub fn codec_type(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
        }
    }

    /// Stream selector letter used in `0:<letter>:<index>`.
    pub fn selector(&self) -> char {
        match self {
            Self::Audio => 'a',
            Self::Subtitle => 's',
        }
    }

    fn placeholder_language(&self, index: usize) -> String {
        match self {
            Self::Audio => format!("und{}", index),
            Self::Subtitle => format!("sub{}", index),
        }
    }

    fn placeholder_title(&self, index: usize) -> String {
        match self {
            Self::Audio => format!("Audio Track {}", index + 1),
            Self::Subtitle => format!("Subtitle {}", index + 1),
        }
    }
}

/// An audio or subtitle track of the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub kind: TrackKind,
    /// Position among the source tracks of the same kind.
    pub index: usize,
    /// Language code, safe to use in a directory name.
    pub language: String,
    /// Human-readable track name.
    pub title: String,
}

impl SourceTrack {
    pub(crate) fn from_stream(kind: TrackKind, index: usize, stream: &ProbeStream) -> Self {
        let language = stream
            .tag("language")
            .map(sanitize_component)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| kind.placeholder_language(index));
        let title = stream
            .tag("title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| kind.placeholder_title(index));

        Self {
            kind,
            index,
            language,
            title,
        }
    }

    /// The encoder stream selector, e.g. `0:a:1`.
    pub fn map_selector(&self) -> String {
        format!("0:{}:{}", self.kind.selector(), self.index)
    }
}

/// Immutable view of the source media's tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProbe {
    pub video_resolution: Option<Resolution>,
    pub audio_tracks: Vec<SourceTrack>,
    pub subtitle_tracks: Vec<SourceTrack>,
}

impl SourceProbe {
    /// Builds the inventory from a parsed probe report.
    pub fn from_report(report: &ProbeReport) -> Self {
        let video_resolution = report
            .streams
            .iter()
            .filter(|s| s.codec_type == "video")
            .find_map(|s| match (s.width, s.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => Some(Resolution::new(w, h)),
                _ => None,
            });

        Self {
            video_resolution,
            audio_tracks: collect_tracks(report, TrackKind::Audio),
            subtitle_tracks: collect_tracks(report, TrackKind::Subtitle),
        }
    }

    pub fn video_height(&self) -> Option<u32> {
        self.video_resolution.map(|r| r.height)
    }
}

fn collect_tracks(report: &ProbeReport, kind: TrackKind) -> Vec<SourceTrack> {
    report
        .streams
        .iter()
        .filter(|s| s.codec_type == kind.codec_type())
        .enumerate()
        .map(|(index, stream)| SourceTrack::from_stream(kind, index, stream))
        .collect()
}

/// Replaces characters that are unsafe in a directory name with `_`.
pub(crate) fn sanitize_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(codec_type: &str) -> ProbeStream {
        ProbeStream {
            codec_type: codec_type.to_string(),
            ..Default::default()
        }
    }

    fn tagged(codec_type: &str, language: &str, title: &str) -> ProbeStream {
        let mut s = stream(codec_type);
        s.tags.insert("language".to_string(), language.to_string());
        s.tags.insert("title".to_string(), title.to_string());
        s
    }

    #[test]
    fn test_resolution_from_first_complete_video_stream() {
        let mut cover = stream("video");
        cover.width = Some(600);
        let mut main = stream("video");
        main.width = Some(1920);
        main.height = Some(1080);
        let mut second = stream("video");
        second.width = Some(640);
        second.height = Some(360);

        let report = ProbeReport {
            streams: vec![stream("audio"), cover, main, second],
        };
        let probe = SourceProbe::from_report(&report);
        assert_eq!(probe.video_resolution, Some(Resolution::new(1920, 1080)));
    }

    #[test]
    fn test_resolution_unknown_without_video() {
        let report = ProbeReport {
            streams: vec![stream("audio")],
        };
        assert_eq!(SourceProbe::from_report(&report).video_height(), None);
    }

    #[test]
    fn test_tracks_preserve_order_and_tags() {
        let report = ProbeReport {
            streams: vec![
                stream("video"),
                tagged("audio", "eng", "English"),
                tagged("subtitle", "fra", "Français"),
                tagged("audio", "jpn", "Japanese"),
            ],
        };
        let probe = SourceProbe::from_report(&report);

        assert_eq!(probe.audio_tracks.len(), 2);
        assert_eq!(probe.audio_tracks[0].language, "eng");
        assert_eq!(probe.audio_tracks[1].language, "jpn");
        assert_eq!(probe.audio_tracks[1].index, 1);
        assert_eq!(probe.audio_tracks[1].map_selector(), "0:a:1");
        assert_eq!(probe.subtitle_tracks[0].title, "Français");
        assert_eq!(probe.subtitle_tracks[0].map_selector(), "0:s:0");
    }

    #[test]
    fn test_missing_tags_get_unique_placeholders() {
        let report = ProbeReport {
            streams: vec![
                stream("audio"),
                stream("audio"),
                stream("subtitle"),
                stream("subtitle"),
            ],
        };
        let probe = SourceProbe::from_report(&report);

        assert_eq!(probe.audio_tracks[0].language, "und0");
        assert_eq!(probe.audio_tracks[1].language, "und1");
        assert_eq!(probe.audio_tracks[1].title, "Audio Track 2");
        assert_eq!(probe.subtitle_tracks[0].language, "sub0");
        assert_eq!(probe.subtitle_tracks[1].title, "Subtitle 2");
    }

    #[test]
    fn test_uppercase_tags_and_sanitized_language() {
        let mut s = stream("audio");
        s.tags.insert("LANGUAGE".to_string(), "en/US".to_string());
        let report = ProbeReport { streams: vec![s] };

        let probe = SourceProbe::from_report(&report);
        assert_eq!(probe.audio_tracks[0].language, "en_US");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(ProbeReport::from_json("not json").is_err());
        assert!(ProbeReport::from_json(r#"{"streams": 3}"#).is_err());
    }

    #[test]
    fn test_from_json_ffprobe_document() {
        let json = r#"{
            "streams": [
                {"index": 0, "codec_name": "h264", "codec_type": "video", "width": 854, "height": 480},
                {"index": 1, "codec_name": "aac", "codec_type": "audio", "tags": {"language": "eng"}}
            ],
            "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "10.0"}
        }"#;
        let report = ProbeReport::from_json(json).unwrap();
        let probe = SourceProbe::from_report(&report);
        assert_eq!(probe.video_height(), Some(480));
        assert_eq!(probe.audio_tracks[0].title, "Audio Track 1");
    }
}
