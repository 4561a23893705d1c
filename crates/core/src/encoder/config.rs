//! Encoder settings, read from the `[encoder]` configuration section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How hlspack invokes ffmpeg and ffprobe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Upper bound on one ffmpeg run; the child is killed when it expires.
    pub timeout_secs: u64,
    /// Passed to `-loglevel`.
    pub ffmpeg_log_level: String,
    /// Appended to every ffmpeg invocation just before the output path.
    pub extra_ffmpeg_args: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout_secs: 60 * 60,
            ffmpeg_log_level: "warning".to_string(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl EncoderConfig {
    /// Default settings with explicit tool locations.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Leading ffmpeg arguments: overwrite outputs, configured verbosity.
    pub fn global_args(&self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            self.ffmpeg_log_level.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.timeout(), Duration::from_secs(3600));
        assert_eq!(config.global_args(), vec!["-y", "-loglevel", "warning"]);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: EncoderConfig = toml::from_str(
            r#"
ffmpeg_path = "/usr/local/bin/ffmpeg"
ffmpeg_log_level = "error"
"#,
        )
        .unwrap();

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.timeout_secs, 3600);
        assert_eq!(config.global_args()[2], "error");
    }
}
