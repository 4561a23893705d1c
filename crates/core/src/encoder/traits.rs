//! Trait definitions for the encoder module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::EncoderError;
use super::types::{EncodeRequest, EncodeResult, ThumbnailRequest};

/// The external transcoding tool, seen as a set of blocking capabilities.
///
/// Every method maps to exactly one invocation of the tool. Implementations
/// must stop the underlying process when the returned future is dropped.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Probes a media file and returns the tool's JSON stream report.
    async fn probe(&self, path: &Path) -> Result<String, EncoderError>;

    /// Encodes and segments one video rendition.
    async fn build_video_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError>;

    /// Encodes and segments one audio track.
    async fn build_audio_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError>;

    /// Extracts one subtitle track as WebVTT.
    async fn build_subtitle_rendition(
        &self,
        request: &EncodeRequest,
    ) -> Result<EncodeResult, EncoderError>;

    /// Writes a single still frame of the source.
    async fn generate_thumbnail(&self, request: &ThumbnailRequest)
        -> Result<PathBuf, EncoderError>;

    /// Validates that the encoder is properly configured and ready.
    async fn validate(&self) -> Result<(), EncoderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::RenditionKind;

    struct EchoEncoder;

    #[async_trait]
    impl Encoder for EchoEncoder {
        fn name(&self) -> &str {
            "echo"
        }

        async fn probe(&self, _path: &Path) -> Result<String, EncoderError> {
            Ok(r#"{"streams": []}"#.to_string())
        }

        async fn build_video_rendition(
            &self,
            request: &EncodeRequest,
        ) -> Result<EncodeResult, EncoderError> {
            Ok(EncodeResult {
                job_id: request.job_id.clone(),
                output_path: request.output_path(),
                duration_ms: 1,
            })
        }

        async fn build_audio_rendition(
            &self,
            request: &EncodeRequest,
        ) -> Result<EncodeResult, EncoderError> {
            self.build_video_rendition(request).await
        }

        async fn build_subtitle_rendition(
            &self,
            _request: &EncodeRequest,
        ) -> Result<EncodeResult, EncoderError> {
            Err(EncoderError::encode_failed("no subtitles", None))
        }

        async fn generate_thumbnail(
            &self,
            request: &ThumbnailRequest,
        ) -> Result<PathBuf, EncoderError> {
            Ok(request.output_path.clone())
        }

        async fn validate(&self) -> Result<(), EncoderError> {
            Ok(())
        }
    }

    fn request() -> EncodeRequest {
        EncodeRequest {
            job_id: "video_720p".to_string(),
            kind: RenditionKind::Video,
            source_path: PathBuf::from("/in.mkv"),
            output_dir: PathBuf::from("/out/video_720p"),
            output_file: "index.m3u8".to_string(),
            map_selector: "0:v:0".to_string(),
            codec: "libx264".to_string(),
            bitrate: Some("2500k".parse().unwrap()),
            resolution: Some("1280x720".parse().unwrap()),
            segment_duration_secs: 6,
            preset: "medium".to_string(),
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let encoder: Box<dyn Encoder> = Box::new(EchoEncoder);
        let result = encoder.build_video_rendition(&request()).await.unwrap();
        assert_eq!(
            result.output_path,
            PathBuf::from("/out/video_720p/index.m3u8")
        );
        assert!(encoder
            .build_subtitle_rendition(&request())
            .await
            .is_err());
    }
}
