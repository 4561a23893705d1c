use super::{types::Config, ConfigError};
use crate::quality::validate_profile_name;

/// Validate configuration
/// Currently validates:
/// - At least one video variant, each with a path-safe name
/// - Segment duration and build parallelism are non-zero
/// - Codecs string is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.video_variants.is_empty() {
        return Err(ConfigError::ValidationError(
            "video_variants cannot be empty".to_string(),
        ));
    }

    for name in config.video_variants.keys() {
        validate_profile_name(name).map_err(|e| {
            ConfigError::ValidationError(format!("video_variants.{}: {}", name, e))
        })?;
    }

    if config.packaging.default_segment_duration == 0 {
        return Err(ConfigError::ValidationError(
            "packaging.default_segment_duration cannot be 0".to_string(),
        ));
    }

    if config.packaging.max_parallel_builds == 0 {
        return Err(ConfigError::ValidationError(
            "packaging.max_parallel_builds cannot be 0".to_string(),
        ));
    }

    if config.packaging.codecs.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "packaging.codecs cannot be empty".to_string(),
        ));
    }

    Ok(())
}
