//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::Encoder;
use super::types::{EncodeRequest, EncodeResult, ThumbnailRequest};

/// Segment file pattern inside each rendition directory.
const SEGMENT_PATTERN: &str = "segment_%05d.ts";

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based encoder implementation.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// HLS muxer arguments shared by video and audio renditions.
    fn hls_muxer_args(request: &EncodeRequest) -> Vec<String> {
        vec![
            "-f".to_string(),
            "hls".to_string(),
            "-hls_time".to_string(),
            request.segment_duration_secs.to_string(),
            "-hls_playlist_type".to_string(),
            "vod".to_string(),
            "-hls_segment_filename".to_string(),
            request
                .output_dir
                .join(SEGMENT_PATTERN)
                .to_string_lossy()
                .to_string(),
        ]
    }

    /// Builds ffmpeg arguments for a video rendition.
    fn build_video_args(&self, request: &EncodeRequest) -> Vec<String> {
        let mut args = self.config.global_args();
        args.extend([
            "-i".to_string(),
            request.source_path.to_string_lossy().to_string(),
            "-map".to_string(),
            request.map_selector.clone(),
            "-c:v".to_string(),
            request.codec.clone(),
        ]);

        if let Some(ref bitrate) = request.bitrate {
            args.extend(["-b:v".to_string(), bitrate.to_string()]);
        }
        if let Some(resolution) = request.resolution {
            args.extend(["-s".to_string(), resolution.to_string()]);
        }

        // Main profile at level 4.0 plays on practically every HLS client.
        args.extend([
            "-profile:v".to_string(),
            "main".to_string(),
            "-level:v".to_string(),
            "4.0".to_string(),
            "-preset".to_string(),
            request.preset.clone(),
            "-force_key_frames".to_string(),
            format!("expr:gte(t,n_forced*{})", request.segment_duration_secs),
        ]);

        args.extend(Self::hls_muxer_args(request));
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(request.output_path().to_string_lossy().to_string());
        args
    }

    /// Builds ffmpeg arguments for an audio rendition.
    fn build_audio_args(&self, request: &EncodeRequest) -> Vec<String> {
        let mut args = self.config.global_args();
        args.extend([
            "-i".to_string(),
            request.source_path.to_string_lossy().to_string(),
            "-map".to_string(),
            request.map_selector.clone(),
            "-c:a".to_string(),
            request.codec.clone(),
        ]);

        if let Some(ref bitrate) = request.bitrate {
            args.extend(["-b:a".to_string(), bitrate.to_string()]);
        }
        args.extend(["-preset".to_string(), request.preset.clone()]);

        args.extend(Self::hls_muxer_args(request));
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(request.output_path().to_string_lossy().to_string());
        args
    }

    /// Builds ffmpeg arguments for a subtitle extraction.
    fn build_subtitle_args(&self, request: &EncodeRequest) -> Vec<String> {
        let mut args = self.config.global_args();
        args.extend([
            "-i".to_string(),
            request.source_path.to_string_lossy().to_string(),
            "-map".to_string(),
            request.map_selector.clone(),
            "-c:s".to_string(),
            request.codec.clone(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(request.output_path().to_string_lossy().to_string());
        args
    }

    /// Builds ffmpeg arguments for a thumbnail.
    fn build_thumbnail_args(&self, request: &ThumbnailRequest) -> Vec<String> {
        let mut args = self.config.global_args();
        args.extend([
            "-ss".to_string(),
            request.seek_time.clone(),
            "-i".to_string(),
            request.source_path.to_string_lossy().to_string(),
            "-vframes".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
        ]);
        args.push(request.output_path.to_string_lossy().to_string());
        args
    }

    /// Runs ffmpeg to completion, killing it on timeout or when dropped.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), EncoderError> {
        debug!(
            "Executing: {} {}",
            self.config.ffmpeg_path.display(),
            args.join(" ")
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    EncoderError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EncoderError::encode_failed("FFmpeg stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr).lines();

        let timeout_duration = self.config.timeout();
        let result = timeout(timeout_duration, async {
            let mut tail: Vec<String> = Vec::new();

            while let Ok(Some(line)) = reader.next_line().await {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.remove(0);
                }
                tail.push(line);
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, Vec<String>), std::io::Error>((status, tail))
        })
        .await;

        match result {
            Ok(Ok((status, tail))) => {
                if status.success() {
                    Ok(())
                } else {
                    Err(EncoderError::encode_failed(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if tail.is_empty() {
                            None
                        } else {
                            Some(tail.join("\n"))
                        },
                    ))
                }
            }
            Ok(Err(e)) => Err(EncoderError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                Err(EncoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        }
    }

    /// Creates the rendition directory, runs ffmpeg, and checks the output exists.
    async fn run_request(
        &self,
        request: &EncodeRequest,
        args: Vec<String>,
    ) -> Result<EncodeResult, EncoderError> {
        let start = Instant::now();

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|_| EncoderError::OutputDirectoryFailed {
                path: request.output_dir.clone(),
            })?;

        self.run_ffmpeg(&args).await?;

        let output_path = request.output_path();
        tokio::fs::metadata(&output_path)
            .await
            .map_err(|_| EncoderError::encode_failed("Output file not created", None))?;

        Ok(EncodeResult {
            job_id: request.job_id.clone(),
            output_path,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<String, EncoderError> {
        if !path.exists() {
            return Err(EncoderError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    EncoderError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(EncoderError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn build_video_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError> {
        self.run_request(request, self.build_video_args(request))
            .await
    }

    async fn build_audio_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError> {
        self.run_request(request, self.build_audio_args(request))
            .await
    }

    async fn build_subtitle_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError> {
        self.run_request(request, self.build_subtitle_args(request))
            .await
    }

    async fn generate_thumbnail(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<PathBuf, EncoderError> {
        self.run_ffmpeg(&self.build_thumbnail_args(request)).await?;
        tokio::fs::metadata(&request.output_path)
            .await
            .map_err(|_| EncoderError::encode_failed("Thumbnail not created", None))?;
        Ok(request.output_path.clone())
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        let ffmpeg_result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffmpeg_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(EncoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(EncoderError::Io(e));
        }

        let ffprobe_result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffprobe_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(EncoderError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                });
            }
            return Err(EncoderError::Io(e));
        }

        Ok(())
    }
}
