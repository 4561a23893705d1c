use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::encoder::EncoderConfig;
use crate::manifest::ManifestOptions;
use crate::quality::{Bitrate, ProfileSet, Resolution, VariantSettings};

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub packaging: PackagingConfig,
    /// Known video profiles. A table given in configuration replaces the
    /// built-in ladder entirely.
    #[serde(default = "default_video_variants")]
    pub video_variants: BTreeMap<String, VariantSettings>,
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            packaging: PackagingConfig::default(),
            video_variants: default_video_variants(),
            deployment: DeploymentConfig::default(),
        }
    }
}

impl Config {
    /// The configured profile ladder in processing order.
    pub fn profiles(&self) -> ProfileSet {
        ProfileSet::from_variants(&self.video_variants)
    }

    /// Options for the master playlist composer.
    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            audio_bitrate: self.packaging.default_audio_bitrate.clone(),
            codecs: self.packaging.codecs.clone(),
        }
    }
}

/// Packaging defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackagingConfig {
    /// Bitrate of every audio rendition; also added to video bandwidth.
    #[serde(default = "default_audio_bitrate")]
    pub default_audio_bitrate: Bitrate,
    /// x264 preset
    #[serde(default = "default_preset")]
    pub default_preset: String,
    /// Target HLS segment length in seconds
    #[serde(default = "default_segment_duration")]
    pub default_segment_duration: u32,
    /// CODECS attribute advertised in the master playlist
    #[serde(default = "default_codecs")]
    pub codecs: String,
    /// Encoder invocations running at once within a stage
    #[serde(default = "default_max_parallel_builds")]
    pub max_parallel_builds: usize,
    /// Seek position of the thumbnail frame
    #[serde(default = "default_thumbnail_time")]
    pub thumbnail_time: String,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            default_audio_bitrate: default_audio_bitrate(),
            default_preset: default_preset(),
            default_segment_duration: default_segment_duration(),
            codecs: default_codecs(),
            max_parallel_builds: default_max_parallel_builds(),
            thumbnail_time: default_thumbnail_time(),
        }
    }
}

fn default_audio_bitrate() -> Bitrate {
    Bitrate::kbps(128)
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_segment_duration() -> u32 {
    6
}

fn default_codecs() -> String {
    "avc1.4D401F,mp4a.40.2".to_string()
}

fn default_max_parallel_builds() -> usize {
    2
}

fn default_thumbnail_time() -> String {
    "00:00:05".to_string()
}

/// The built-in 144p..1080p ladder.
pub fn default_video_variants() -> BTreeMap<String, VariantSettings> {
    [
        ("144p", 256, 144, 300, 10),
        ("240p", 426, 240, 500, 20),
        ("360p", 640, 360, 800, 30),
        ("480p", 854, 480, 1200, 40),
        ("720p", 1280, 720, 2500, 50),
        ("1080p", 1920, 1080, 4500, 60),
    ]
    .into_iter()
    .map(|(name, width, height, kbps, order)| {
        (
            name.to_string(),
            VariantSettings {
                resolution: Resolution::new(width, height),
                bitrate: Bitrate::kbps(kbps),
                order,
            },
        )
    })
    .collect()
}

/// Deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub github: GithubPagesConfig,
}

/// GitHub Pages publishing. Credentials are never read from this file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GithubPagesConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// Staging directory name, created next to the package directory.
    #[serde(default = "default_temp_deploy_dir")]
    pub temp_deploy_dir: String,
}

impl Default for GithubPagesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_branch: default_branch(),
            temp_deploy_dir: default_temp_deploy_dir(),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_temp_deploy_dir() -> String {
    "_deploy_tmp".to_string()
}
