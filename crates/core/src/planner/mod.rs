//! Rendition planner.
//!
//! Decides which video qualities to build from the profile table, the
//! user's request, and the source height, and which audio/subtitle tracks
//! to carry over.

mod error;
mod types;

pub use error::PlanningError;
pub use types::{
    PlannedAudioRendition, PlannedSubtitleRendition, PlannedVideoRendition, QualityRequest,
};

use tracing::{info, warn};

use crate::inventory::SourceProbe;
use crate::quality::{ProfileSet, QualityProfile};

/// Plans the video renditions to build, in ascending profile order.
///
/// Unknown requested names are dropped with a warning; if nothing valid
/// remains the full profile set is used instead. Profiles taller than the
/// source are never planned. An empty result is an error: a package with no
/// video is not playable.
pub fn plan_video(
    profiles: &ProfileSet,
    request: &QualityRequest,
    source_height: Option<u32>,
) -> Result<Vec<PlannedVideoRendition>, PlanningError> {
    let selected: Vec<&QualityProfile> = match request {
        QualityRequest::All => profiles.iter().collect(),
        QualityRequest::Named(names) => {
            let invalid: Vec<&str> = names
                .iter()
                .map(String::as_str)
                .filter(|n| !profiles.contains(n))
                .collect();
            if !invalid.is_empty() {
                warn!(
                    "Ignoring invalid video qualities: {}. Available: {}",
                    invalid.join(", "),
                    profiles.names().join(", ")
                );
            }

            let valid: Vec<&QualityProfile> = profiles
                .iter()
                .filter(|p| names.iter().any(|n| n == &p.name))
                .collect();
            if valid.is_empty() {
                warn!("No valid video qualities selected. Defaulting to all suitable qualities.");
                profiles.iter().collect()
            } else {
                valid
            }
        }
    };

    let planned: Vec<PlannedVideoRendition> = selected
        .into_iter()
        .filter(|profile| match source_height {
            Some(height) if profile.height() > height => {
                info!(
                    "Skipping {} ({}p) as it's higher than input video height ({}p)",
                    profile.name,
                    profile.height(),
                    height
                );
                false
            }
            _ => true,
        })
        .map(|profile| PlannedVideoRendition {
            profile: profile.clone(),
        })
        .collect();

    if planned.is_empty() {
        return Err(PlanningError::Empty {
            requested: request.to_string(),
            source_height: source_height
                .map(|h| format!("{}p", h))
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }

    info!(
        "Target video qualities: {}",
        planned
            .iter()
            .map(|p| p.profile.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(planned)
}

/// Plans one audio rendition per source audio track, in source order.
pub fn plan_audio(probe: &SourceProbe) -> Vec<PlannedAudioRendition> {
    if probe.audio_tracks.is_empty() {
        warn!("No audio streams found in the input file.");
    }
    probe
        .audio_tracks
        .iter()
        .map(|track| PlannedAudioRendition {
            track: track.clone(),
        })
        .collect()
}

/// Plans one subtitle rendition per source subtitle track, in source order.
pub fn plan_subtitles(probe: &SourceProbe) -> Vec<PlannedSubtitleRendition> {
    if probe.subtitle_tracks.is_empty() {
        info!("No subtitle streams found in the input file.");
    }
    probe
        .subtitle_tracks
        .iter()
        .map(|track| PlannedSubtitleRendition {
            track: track.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{ProbeReport, ProbeStream};
    use crate::testing::fixtures;

    fn names(planned: &[PlannedVideoRendition]) -> Vec<&str> {
        planned.iter().map(|p| p.profile.name.as_str()).collect()
    }

    #[test]
    fn test_parse_request() {
        assert_eq!(QualityRequest::parse(None), QualityRequest::All);
        assert_eq!(QualityRequest::parse(Some("ALL")), QualityRequest::All);
        assert_eq!(QualityRequest::parse(Some(" , ")), QualityRequest::All);
        assert_eq!(
            QualityRequest::parse(Some("1080p, 720p,")),
            QualityRequest::Named(vec!["1080p".to_string(), "720p".to_string()])
        );
    }

    #[test]
    fn test_all_with_unknown_height_keeps_everything() {
        let profiles = fixtures::default_profiles();
        let planned = plan_video(&profiles, &QualityRequest::All, None).unwrap();
        assert_eq!(
            names(&planned),
            vec!["144p", "240p", "360p", "480p", "720p", "1080p"]
        );
    }

    #[test]
    fn test_no_upscaling_beyond_source() {
        let profiles = fixtures::default_profiles();
        let planned = plan_video(&profiles, &QualityRequest::All, Some(480)).unwrap();
        assert_eq!(names(&planned), vec!["144p", "240p", "360p", "480p"]);

        for height in [100, 144, 300, 719, 720, 2160] {
            if let Ok(planned) = plan_video(&profiles, &QualityRequest::All, Some(height)) {
                assert!(planned.iter().all(|p| p.profile.height() <= height));
            }
        }
    }

    #[test]
    fn test_requested_names_follow_profile_order() {
        let profiles = fixtures::default_profiles();
        let request = QualityRequest::parse(Some("1080p,240p,720p"));
        let planned = plan_video(&profiles, &request, None).unwrap();
        assert_eq!(names(&planned), vec!["240p", "720p", "1080p"]);
    }

    #[test]
    fn test_unknown_names_dropped() {
        let profiles = fixtures::default_profiles();
        let request = QualityRequest::parse(Some("1080p,9999p"));
        let planned = plan_video(&profiles, &request, None).unwrap();
        assert_eq!(names(&planned), vec!["1080p"]);
    }

    #[test]
    fn test_only_unknown_names_fall_back_to_all() {
        let profiles = fixtures::default_profiles();
        for request in ["9999p", "4k,8k", "1080P"] {
            let planned =
                plan_video(&profiles, &QualityRequest::parse(Some(request)), None).unwrap();
            assert_eq!(planned.len(), profiles.len(), "request {:?}", request);
        }
    }

    #[test]
    fn test_fallback_still_respects_height() {
        let profiles = fixtures::default_profiles();
        let planned =
            plan_video(&profiles, &QualityRequest::parse(Some("8k")), Some(360)).unwrap();
        assert_eq!(names(&planned), vec!["144p", "240p", "360p"]);
    }

    #[test]
    fn test_empty_plan_is_error() {
        let profiles = fixtures::default_profiles();
        let result = plan_video(&profiles, &QualityRequest::All, Some(100));
        assert!(matches!(result, Err(PlanningError::Empty { .. })));

        let result = plan_video(&profiles, &QualityRequest::parse(Some("1080p")), Some(720));
        assert!(matches!(result, Err(PlanningError::Empty { .. })));
    }

    #[test]
    fn test_empty_profile_set_is_error() {
        let result = plan_video(&ProfileSet::default(), &QualityRequest::All, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_tracks_preserves_source_order() {
        let report = ProbeReport {
            streams: vec![
                fixtures::audio_stream(Some("eng"), Some("English")),
                fixtures::subtitle_stream(Some("spa"), None),
                fixtures::audio_stream(Some("deu"), None),
                ProbeStream {
                    codec_type: "data".to_string(),
                    ..Default::default()
                },
            ],
        };
        let probe = SourceProbe::from_report(&report);

        let audio = plan_audio(&probe);
        assert_eq!(audio.len(), 2);
        assert_eq!(audio[0].dir_name(), "audio_eng_0");
        assert_eq!(audio[1].dir_name(), "audio_deu_1");

        let subtitles = plan_subtitles(&probe);
        assert_eq!(subtitles.len(), 1);
        assert_eq!(subtitles[0].dir_name(), "sub_spa_0");
        assert_eq!(subtitles[0].file_name(), "subtitles_spa_0.vtt");
    }
}
