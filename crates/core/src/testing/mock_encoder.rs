//! Mock encoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::encoder::{EncodeRequest, EncodeResult, Encoder, EncoderError, ThumbnailRequest};
use crate::inventory::ProbeReport;

use super::fixtures;

/// A recorded encode request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The request that was submitted.
    pub request: EncodeRequest,
    /// Whether the build succeeded.
    pub success: bool,
}

/// Mock implementation of the Encoder trait.
///
/// Provides controllable behavior for testing:
/// - Track encode requests for assertions
/// - Fail specific renditions by job id
/// - Control probe output
/// - Optionally write placeholder outputs to disk
///
/// Clones share state, so a test can keep a handle after moving one into an
/// orchestrator.
///
/// # Example
///
/// ```rust,ignore
/// use hlspack_core::testing::MockEncoder;
///
/// let encoder = MockEncoder::new();
/// encoder.set_probe_report(fixtures::probe_report(480, 1, 2)).await;
/// encoder.fail_job("sub_sub1_1").await;
///
/// let report = orchestrator.run(request).await?;
/// assert_eq!(encoder.request_count().await, 6);
/// ```
#[derive(Debug, Clone)]
pub struct MockEncoder {
    /// Recorded build requests.
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    /// Recorded thumbnail requests.
    thumbnails: Arc<RwLock<Vec<ThumbnailRequest>>>,
    /// Raw probe output returned by `probe`.
    probe_output: Arc<RwLock<String>>,
    /// Whether `probe` fails.
    probe_fails: Arc<RwLock<bool>>,
    /// Job ids whose builds fail.
    failing_jobs: Arc<RwLock<HashSet<String>>>,
    /// Whether every video build fails.
    fail_all_video: Arc<RwLock<bool>>,
    /// Whether thumbnail generation fails.
    thumbnail_fails: Arc<RwLock<bool>>,
    /// Simulated build duration in milliseconds.
    build_duration_ms: Arc<RwLock<u64>>,
    /// Whether to create output files on disk.
    write_outputs: Arc<RwLock<bool>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create a new mock encoder probing as a 1080p source with one audio track.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            thumbnails: Arc::new(RwLock::new(Vec::new())),
            probe_output: Arc::new(RwLock::new(fixtures::probe_report(1080, 1, 0).to_json())),
            probe_fails: Arc::new(RwLock::new(false)),
            failing_jobs: Arc::new(RwLock::new(HashSet::new())),
            fail_all_video: Arc::new(RwLock::new(false)),
            thumbnail_fails: Arc::new(RwLock::new(false)),
            build_duration_ms: Arc::new(RwLock::new(0)),
            write_outputs: Arc::new(RwLock::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded build requests, in completion order.
    pub async fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of build requests issued.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Get all recorded thumbnail requests.
    pub async fn recorded_thumbnails(&self) -> Vec<ThumbnailRequest> {
        self.thumbnails.read().await.clone()
    }

    /// Highest number of builds observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Set the probe output from a structured report.
    pub async fn set_probe_report(&self, report: ProbeReport) {
        *self.probe_output.write().await = report.to_json();
    }

    /// Set the raw probe output.
    pub async fn set_probe_output(&self, output: impl Into<String>) {
        *self.probe_output.write().await = output.into();
    }

    /// Make `probe` fail.
    pub async fn set_probe_fails(&self, fails: bool) {
        *self.probe_fails.write().await = fails;
    }

    /// Make the build with this job id (rendition directory name) fail.
    pub async fn fail_job(&self, job_id: impl Into<String>) {
        self.failing_jobs.write().await.insert(job_id.into());
    }

    /// Make every video build fail.
    pub async fn set_fail_all_video(&self, fail: bool) {
        *self.fail_all_video.write().await = fail;
    }

    /// Make thumbnail generation fail.
    pub async fn set_thumbnail_fails(&self, fails: bool) {
        *self.thumbnail_fails.write().await = fails;
    }

    /// Set the simulated build duration.
    pub async fn set_build_duration(&self, duration: Duration) {
        *self.build_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Create placeholder playlists and subtitle files on successful builds.
    pub async fn set_write_outputs(&self, write: bool) {
        *self.write_outputs.write().await = write;
    }

    async fn should_fail(&self, request: &EncodeRequest) -> bool {
        if self.failing_jobs.read().await.contains(&request.job_id) {
            return true;
        }
        request.kind == crate::encoder::RenditionKind::Video && *self.fail_all_video.read().await
    }

    async fn build(&self, request: &EncodeRequest) -> Result<EncodeResult, EncoderError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let duration_ms = *self.build_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let result: Result<EncodeResult, EncoderError> = if self.should_fail(request).await {
            self.write_partial_output(request).await.and_then(|()| {
                Err(EncoderError::encode_failed(
                    format!("mock failure for {}", request.job_id),
                    Some("simulated encoder error".to_string()),
                ))
            })
        } else {
            self.write_output(request).await.map(|output_path| EncodeResult {
                job_id: request.job_id.clone(),
                output_path,
                duration_ms,
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.requests.write().await.push(RecordedRequest {
            request: request.clone(),
            success: result.is_ok(),
        });
        result
    }

    /// Leaves a stray segment behind, as an encoder killed mid-run would.
    async fn write_partial_output(&self, request: &EncodeRequest) -> Result<(), EncoderError> {
        if *self.write_outputs.read().await {
            tokio::fs::create_dir_all(&request.output_dir).await?;
            tokio::fs::write(request.output_dir.join("segment_00000.ts"), b"partial").await?;
        }
        Ok(())
    }

    async fn write_output(&self, request: &EncodeRequest) -> Result<PathBuf, EncoderError> {
        let output_path = request.output_path();
        if *self.write_outputs.read().await {
            tokio::fs::create_dir_all(&request.output_dir).await?;
            tokio::fs::write(&output_path, b"#EXTM3U\n").await?;
        }
        Ok(output_path)
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, _path: &Path) -> Result<String, EncoderError> {
        if *self.probe_fails.read().await {
            return Err(EncoderError::probe_failed("mock probe failure"));
        }
        Ok(self.probe_output.read().await.clone())
    }

    async fn build_video_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError> {
        self.build(request).await
    }

    async fn build_audio_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError> {
        self.build(request).await
    }

    async fn build_subtitle_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError> {
        self.build(request).await
    }

    async fn generate_thumbnail(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<PathBuf, EncoderError> {
        self.thumbnails.write().await.push(request.clone());
        if *self.thumbnail_fails.read().await {
            return Err(EncoderError::encode_failed("mock thumbnail failure", None));
        }
        Ok(request.output_path.clone())
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        Ok(())
    }
}
