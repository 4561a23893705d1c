//! Rendition builder.
//!
//! Turns planned renditions into encode requests, runs them through an
//! [`Encoder`] on a bounded pool, and reports one [`TrackOutcome`] per
//! planned item in plan order. A stage's future resolves only after every
//! request in it has finished; dropping it drops the in-flight encoder calls.

mod types;

pub use types::{
    partition_outcomes, BuildSettings, BuiltAudioRendition, BuiltSubtitleRendition,
    BuiltVideoRendition, SkippedRendition, TrackOutcome,
};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::encoder::{EncodeRequest, Encoder, EncoderError, RenditionKind};
use crate::planner::{PlannedAudioRendition, PlannedSubtitleRendition, PlannedVideoRendition};

const VIDEO_CODEC: &str = "libx264";
const AUDIO_CODEC: &str = "aac";
const SUBTITLE_CODEC: &str = "webvtt";
const PLAYLIST_FILE: &str = "index.m3u8";

/// Builds planned renditions through an encoder.
pub struct RenditionBuilder<'a, E: Encoder + ?Sized> {
    encoder: &'a E,
    settings: &'a BuildSettings,
}

impl<'a, E: Encoder + ?Sized> RenditionBuilder<'a, E> {
    pub fn new(encoder: &'a E, settings: &'a BuildSettings) -> Self {
        Self { encoder, settings }
    }

    fn parallelism(&self) -> usize {
        self.settings.max_parallel.max(1)
    }

    fn base_request(
        &self,
        kind: RenditionKind,
        dir_name: String,
        output_file: String,
        map_selector: String,
        codec: &str,
    ) -> EncodeRequest {
        EncodeRequest {
            output_dir: self.settings.package_dir.join(&dir_name),
            job_id: dir_name,
            kind,
            source_path: self.settings.source_path.clone(),
            output_file,
            map_selector,
            codec: codec.to_string(),
            bitrate: None,
            resolution: None,
            segment_duration_secs: self.settings.segment_duration_secs,
            preset: self.settings.preset.clone(),
        }
    }

    /// Encode request for a planned video rendition.
    pub fn video_request(&self, planned: &PlannedVideoRendition) -> EncodeRequest {
        EncodeRequest {
            bitrate: Some(planned.profile.bitrate.clone()),
            resolution: Some(planned.profile.resolution),
            ..self.base_request(
                RenditionKind::Video,
                planned.dir_name(),
                PLAYLIST_FILE.to_string(),
                "0:v:0".to_string(),
                VIDEO_CODEC,
            )
        }
    }

    /// Encode request for a planned audio rendition.
    pub fn audio_request(&self, planned: &PlannedAudioRendition) -> EncodeRequest {
        EncodeRequest {
            bitrate: Some(self.settings.audio_bitrate.clone()),
            ..self.base_request(
                RenditionKind::Audio,
                planned.dir_name(),
                PLAYLIST_FILE.to_string(),
                planned.track.map_selector(),
                AUDIO_CODEC,
            )
        }
    }

    /// Extraction request for a planned subtitle rendition.
    pub fn subtitle_request(&self, planned: &PlannedSubtitleRendition) -> EncodeRequest {
        self.base_request(
            RenditionKind::Subtitle,
            planned.dir_name(),
            planned.file_name(),
            planned.track.map_selector(),
            SUBTITLE_CODEC,
        )
    }

    /// Builds every planned video rendition.
    pub async fn build_video(
        &self,
        planned: &[PlannedVideoRendition],
    ) -> Vec<TrackOutcome<BuiltVideoRendition>> {
        stream::iter(planned)
            .map(|p| async move {
                let request = self.video_request(p);
                info!("Processing video rendition: {}", p.profile.name);
                let result = self.encoder.build_video_rendition(&request).await;
                self.outcome(&request, result, || BuiltVideoRendition {
                    profile: p.profile.clone(),
                    playlist_path: relative_path(&request),
                })
                .await
            })
            .buffered(self.parallelism())
            .collect()
            .await
    }

    /// Builds every planned audio rendition.
    pub async fn build_audio(
        &self,
        planned: &[PlannedAudioRendition],
    ) -> Vec<TrackOutcome<BuiltAudioRendition>> {
        stream::iter(planned)
            .map(|p| async move {
                let request = self.audio_request(p);
                info!(
                    "Processing audio rendition: {} ({})",
                    p.track.title, p.track.language
                );
                let result = self.encoder.build_audio_rendition(&request).await;
                self.outcome(&request, result, || BuiltAudioRendition {
                    language: p.track.language.clone(),
                    name: p.track.title.clone(),
                    playlist_path: relative_path(&request),
                })
                .await
            })
            .buffered(self.parallelism())
            .collect()
            .await
    }

    /// Extracts every planned subtitle track. Failures only drop that track.
    pub async fn build_subtitles(
        &self,
        planned: &[PlannedSubtitleRendition],
    ) -> Vec<TrackOutcome<BuiltSubtitleRendition>> {
        stream::iter(planned)
            .map(|p| async move {
                let request = self.subtitle_request(p);
                info!("Processing subtitle: {} ({})", p.track.title, p.track.language);
                let result = self.encoder.build_subtitle_rendition(&request).await;
                self.outcome(&request, result, || BuiltSubtitleRendition {
                    language: p.track.language.clone(),
                    name: p.track.title.clone(),
                    subtitle_path: relative_path(&request),
                })
                .await
            })
            .buffered(self.parallelism())
            .collect()
            .await
    }

    /// Classifies a build result. A failed build's directory is removed so
    /// the package only holds built renditions.
    async fn outcome<T, R>(
        &self,
        request: &EncodeRequest,
        result: Result<R, EncoderError>,
        built: impl FnOnce() -> T,
    ) -> TrackOutcome<T> {
        match result {
            Ok(_) => {
                debug!("Finished {} rendition {}", request.kind.as_str(), request.job_id);
                TrackOutcome::Built(built())
            }
            Err(e) => {
                warn!(
                    "Could not build {} rendition {}: {}",
                    request.kind.as_str(),
                    request.job_id,
                    e
                );
                if let Some(stderr) = e.stderr() {
                    debug!("Encoder output for {}: {}", request.job_id, stderr);
                }
                discard_partial_output(request).await;
                TrackOutcome::Skipped(SkippedRendition {
                    kind: request.kind,
                    label: request.job_id.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

async fn discard_partial_output(request: &EncodeRequest) {
    match tokio::fs::remove_dir_all(&request.output_dir).await {
        Ok(()) => debug!(
            "Removed partial output of {}: {}",
            request.job_id,
            request.output_dir.display()
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Could not remove partial output {}: {}",
            request.output_dir.display(),
            e
        ),
    }
}

/// Path of the request's output relative to the package root.
fn relative_path(request: &EncodeRequest) -> String {
    format!("{}/{}", request.job_id, request.output_file)
}
