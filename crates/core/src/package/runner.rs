//! Package orchestrator implementation.
//!
//! Drives one source file through the packaging stages in strict order.
//! Builds inside a stage run on a bounded pool; stages never overlap.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::builder::{partition_outcomes, BuildSettings, RenditionBuilder};
use crate::config::Config;
use crate::deploy::Deployer;
use crate::encoder::{Encoder, ThumbnailRequest};
use crate::inventory::probe_source;
use crate::manifest::{compose_master_playlist, write_master_playlist};
use crate::planner::{plan_audio, plan_subtitles, plan_video};

use super::error::PackageError;
use super::types::{DeploymentOutcome, PackageReport, PackageRequest, PackageStage, PackageState};

/// Records and broadcasts state transitions of one run.
struct Transitions<'a> {
    tx: &'a watch::Sender<PackageState>,
    visited: Vec<PackageState>,
}

impl<'a> Transitions<'a> {
    fn new(tx: &'a watch::Sender<PackageState>) -> Self {
        Self {
            tx,
            visited: Vec::new(),
        }
    }

    fn enter(&mut self, state: PackageState) {
        info!("Package state -> {}", state);
        self.visited.push(state.clone());
        self.tx.send_replace(state);
    }

    fn stage(&mut self, stage: PackageStage) {
        self.enter(PackageState::Running { stage });
    }

    fn fail(&mut self, err: PackageError) -> PackageError {
        error!("Packaging failed during {}: {}", err.stage(), err);
        self.enter(PackageState::Failed {
            stage: err.stage(),
            reason: err.to_string(),
        });
        err
    }
}

/// Packages a source file into an HLS tree.
pub struct PackageOrchestrator<E>
where
    E: Encoder + ?Sized,
{
    encoder: Arc<E>,
    config: Config,
    deployer: Option<Arc<dyn Deployer>>,
    deployer_unavailable: Option<String>,
    state_tx: watch::Sender<PackageState>,
}

impl<E> PackageOrchestrator<E>
where
    E: Encoder + ?Sized,
{
    pub fn new(encoder: Arc<E>, config: Config) -> Self {
        let (state_tx, _) = watch::channel(PackageState::Pending);
        Self {
            encoder,
            config,
            deployer: None,
            deployer_unavailable: None,
            state_tx,
        }
    }

    /// Sets the deployer used when a run asks for deployment.
    pub fn with_deployer(mut self, deployer: Arc<dyn Deployer>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    /// Records why no deployer could be built; reported when a run asks for deployment.
    pub fn with_deployer_unavailable(mut self, reason: impl Into<String>) -> Self {
        self.deployer_unavailable = Some(reason.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current state of the most recent run.
    pub fn state(&self) -> PackageState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PackageState> {
        self.state_tx.subscribe()
    }

    /// Runs the full packaging pipeline for one source.
    ///
    /// Dropping the returned future cancels the run; in-flight encoder
    /// invocations are dropped with it.
    pub async fn run(&self, request: &PackageRequest) -> Result<PackageReport, PackageError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut transitions = Transitions::new(&self.state_tx);
        transitions.enter(PackageState::Pending);
        info!(
            "Starting package run {} for {} -> {}",
            run_id,
            request.input.display(),
            request.output_dir.display()
        );

        // Probing
        transitions.stage(PackageStage::Probing);
        if request.segment_duration_secs == Some(0) {
            return Err(transitions.fail(PackageError::ZeroSegmentDuration));
        }
        if !tokio::fs::try_exists(&request.input).await.unwrap_or(false) {
            return Err(transitions.fail(PackageError::InputNotFound {
                path: request.input.clone(),
            }));
        }
        if let Err(source) = tokio::fs::create_dir_all(&request.output_dir).await {
            return Err(transitions.fail(PackageError::OutputDirectory {
                path: request.output_dir.clone(),
                source,
            }));
        }
        let probe = match probe_source(self.encoder.as_ref(), &request.input).await {
            Ok(probe) => probe,
            Err(e) => return Err(transitions.fail(e.into())),
        };

        // Planning
        transitions.stage(PackageStage::Planning);
        let profiles = self.config.profiles();
        let planned_video = match plan_video(&profiles, &request.qualities, probe.video_height()) {
            Ok(planned) => planned,
            Err(e) => return Err(transitions.fail(e.into())),
        };
        let planned_audio = plan_audio(&probe);
        let planned_subtitles = plan_subtitles(&probe);
        info!(
            "Planned {} video, {} audio and {} subtitle renditions",
            planned_video.len(),
            planned_audio.len(),
            planned_subtitles.len()
        );

        let packaging = &self.config.packaging;
        let settings = BuildSettings {
            source_path: request.input.clone(),
            package_dir: request.output_dir.clone(),
            segment_duration_secs: request
                .segment_duration_secs
                .unwrap_or(packaging.default_segment_duration),
            preset: request
                .preset
                .clone()
                .unwrap_or_else(|| packaging.default_preset.clone()),
            audio_bitrate: packaging.default_audio_bitrate.clone(),
            max_parallel: packaging.max_parallel_builds,
        };
        let builder = RenditionBuilder::new(self.encoder.as_ref(), &settings);

        // BuildingVideo
        transitions.stage(PackageStage::BuildingVideo);
        let (video, mut skipped) = partition_outcomes(builder.build_video(&planned_video).await);
        if video.is_empty() {
            return Err(transitions.fail(PackageError::NoVideoRenditions { failures: skipped }));
        }

        // BuildingAudio
        transitions.stage(PackageStage::BuildingAudio);
        let (audio, audio_skipped) = partition_outcomes(builder.build_audio(&planned_audio).await);
        skipped.extend(audio_skipped);

        // BuildingSubtitles
        transitions.stage(PackageStage::BuildingSubtitles);
        let (subtitles, subtitle_skipped) =
            partition_outcomes(builder.build_subtitles(&planned_subtitles).await);
        skipped.extend(subtitle_skipped);

        // Composing
        transitions.stage(PackageStage::Composing);
        let contents =
            compose_master_playlist(&video, &audio, &subtitles, &self.config.manifest_options());
        let master_playlist = match write_master_playlist(&request.output_dir, &contents).await {
            Ok(path) => path,
            Err(e) => return Err(transitions.fail(e.into())),
        };

        transitions.enter(PackageState::Done);
        info!(
            "HLS packaging finished: {} video, {} audio, {} subtitle renditions ({} skipped)",
            video.len(),
            audio.len(),
            subtitles.len(),
            skipped.len()
        );

        let thumbnail = if request.generate_thumbnail {
            self.thumbnail(request).await
        } else {
            None
        };

        let deployment = if request.deploy {
            Some(self.deploy(&request.output_dir).await)
        } else {
            None
        };

        Ok(PackageReport {
            run_id,
            input: request.input.clone(),
            output_dir: request.output_dir.clone(),
            started_at,
            finished_at: Utc::now(),
            states: transitions.visited,
            video,
            audio,
            subtitles,
            skipped,
            master_playlist,
            thumbnail,
            deployment,
        })
    }

    /// Extracts a still frame; failures never affect the run outcome.
    async fn thumbnail(&self, request: &PackageRequest) -> Option<PathBuf> {
        let thumbnail_request = ThumbnailRequest {
            source_path: request.input.clone(),
            output_path: thumbnail_path(&request.input, &request.output_dir),
            seek_time: request
                .thumbnail_time
                .clone()
                .unwrap_or_else(|| self.config.packaging.thumbnail_time.clone()),
        };

        match self.encoder.generate_thumbnail(&thumbnail_request).await {
            Ok(path) => {
                info!("Thumbnail generated: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to generate thumbnail: {}", e);
                None
            }
        }
    }

    /// Hands the package to the deployer; failures are reported, not raised.
    async fn deploy(&self, package_dir: &Path) -> DeploymentOutcome {
        if !self.config.deployment.github.enabled {
            let reason = "deployment is disabled in configuration".to_string();
            warn!("Deployment requested but {}", reason);
            return DeploymentOutcome::Skipped { reason };
        }

        let Some(deployer) = &self.deployer else {
            let reason = self
                .deployer_unavailable
                .clone()
                .unwrap_or_else(|| "no deployer is configured".to_string());
            warn!("Deployment requested but {}", reason);
            return DeploymentOutcome::Skipped { reason };
        };

        info!("Deploying package with {}", deployer.name());
        match deployer.deploy(package_dir).await {
            Ok(result) => DeploymentOutcome::Deployed(result),
            Err(e) if e.is_skipped() => {
                warn!("{}", e);
                DeploymentOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                error!("Deployment with {} failed: {}", deployer.name(), e);
                DeploymentOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// `<output>/<input stem>_thumbnail.jpg`
fn thumbnail_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}_thumbnail.jpg", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_path() {
        assert_eq!(
            thumbnail_path(Path::new("/media/My Movie.mkv"), Path::new("/out/movie")),
            PathBuf::from("/out/movie/My Movie_thumbnail.jpg")
        );
    }

    #[test]
    fn test_new_orchestrator_is_pending() {
        let encoder = Arc::new(crate::testing::MockEncoder::new());
        let orchestrator = PackageOrchestrator::new(encoder, Config::default());
        assert_eq!(orchestrator.state(), PackageState::Pending);
    }
}
