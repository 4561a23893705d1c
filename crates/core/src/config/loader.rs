use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{types::Config, ConfigError};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "HLSPACK_";

const DEFAULT_CONFIG_FILE: &str = "hlspack.toml";

/// Config path from `HLSPACK_CONFIG`, else `hlspack.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("HLSPACK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration from file with environment variable overrides.
///
/// A missing file is not an error: built-in defaults apply, still
/// overridable through `HLSPACK_<SECTION>__<KEY>` variables.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("Config file {} not found, using defaults", path.display());
    }

    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[packaging]
default_segment_duration = 4
max_parallel_builds = 3
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.packaging.default_segment_duration, 4);
        assert_eq!(config.packaging.max_parallel_builds, 3);
        assert_eq!(config.packaging.default_preset, "medium");
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[packaging]
default_segment_duration = "six"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/hlspack.toml")).unwrap();
        assert_eq!(config.video_variants.len(), 6);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[encoder]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 60

[video_variants.360p]
resolution = "640x360"
bitrate = "800k"
order = 30

[deployment.github]
enabled = true
default_branch = "gh-pages"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(
            config.encoder.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.encoder.timeout_secs, 60);
        assert_eq!(config.profiles().names(), vec!["360p"]);
        assert!(config.deployment.github.enabled);
        assert_eq!(config.deployment.github.default_branch, "gh-pages");
    }
}
