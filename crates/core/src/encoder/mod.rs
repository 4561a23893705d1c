//! Encoder module: the boundary toward the external transcoding tool.
//!
//! The [`Encoder`] trait exposes one method per kind of invocation (probe,
//! video rendition, audio rendition, subtitle extraction, thumbnail).
//! [`FfmpegEncoder`] shells out to `ffmpeg`/`ffprobe`; tests use
//! `testing::MockEncoder`.
//!
//! # Example
//!
//! ```ignore
//! use hlspack_core::encoder::{Encoder, FfmpegEncoder, EncoderConfig};
//!
//! let encoder = FfmpegEncoder::new(EncoderConfig::default());
//! encoder.validate().await?;
//! let json = encoder.probe(Path::new("/path/to/input.mkv")).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncoderError;
pub use ffmpeg::FfmpegEncoder;
pub use traits::Encoder;
pub use types::{EncodeRequest, EncodeResult, RenditionKind, ThumbnailRequest};
