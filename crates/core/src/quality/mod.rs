//! Video quality profiles.
//!
//! A profile is one named rung of the bitrate ladder (`720p` at `2500k`,
//! `1280x720`). The table of known profiles comes from configuration and is
//! immutable for the duration of a packaging run.

mod bitrate;
mod error;
mod resolution;

pub use bitrate::{parse_bitrate, Bitrate, MAX_BITS_PER_SECOND};
pub use error::QualityError;
pub use resolution::Resolution;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for one named video variant, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSettings {
    pub resolution: Resolution,
    pub bitrate: Bitrate,
    /// Processing order; lower values are built first.
    #[serde(default)]
    pub order: i64,
}

/// A named video variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub name: String,
    pub resolution: Resolution,
    pub bitrate: Bitrate,
    pub order: i64,
}

impl QualityProfile {
    pub fn new(name: impl Into<String>, resolution: Resolution, bitrate: Bitrate, order: i64) -> Self {
        Self {
            name: name.into(),
            resolution,
            bitrate,
            order,
        }
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }
}

/// The known quality profiles, sorted ascending by `order` (ties by name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSet {
    profiles: Vec<QualityProfile>,
}

impl ProfileSet {
    /// Builds a profile set from arbitrary profiles.
    pub fn new(mut profiles: Vec<QualityProfile>) -> Self {
        profiles.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Self { profiles }
    }

    /// Builds a profile set from the configured variant table.
    pub fn from_variants(variants: &BTreeMap<String, VariantSettings>) -> Self {
        Self::new(
            variants
                .iter()
                .map(|(name, settings)| {
                    QualityProfile::new(
                        name.clone(),
                        settings.resolution,
                        settings.bitrate.clone(),
                        settings.order,
                    )
                })
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&QualityProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Profile names in processing order.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualityProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Checks that a profile name is usable inside `video_<name>`.
pub fn validate_profile_name(name: &str) -> Result<(), QualityError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && name != "."
        && name != "..";
    if valid {
        Ok(())
    } else {
        Err(QualityError::InvalidProfileName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(resolution: &str, bitrate: &str, order: i64) -> VariantSettings {
        VariantSettings {
            resolution: resolution.parse().unwrap(),
            bitrate: bitrate.parse().unwrap(),
            order,
        }
    }

    #[test]
    fn test_profile_set_sorted_by_order() {
        let mut variants = BTreeMap::new();
        variants.insert("720p".to_string(), settings("1280x720", "2500k", 50));
        variants.insert("144p".to_string(), settings("256x144", "300k", 10));
        variants.insert("480p".to_string(), settings("854x480", "1200k", 40));

        let set = ProfileSet::from_variants(&variants);
        assert_eq!(set.names(), vec!["144p", "480p", "720p"]);
        assert_eq!(set.get("480p").unwrap().height(), 480);
    }

    #[test]
    fn test_profile_set_ties_broken_by_name() {
        let set = ProfileSet::new(vec![
            QualityProfile::new("b", "640x360".parse().unwrap(), "800k".parse().unwrap(), 1),
            QualityProfile::new("a", "640x360".parse().unwrap(), "900k".parse().unwrap(), 1),
        ]);
        assert_eq!(set.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_validate_profile_name() {
        assert!(validate_profile_name("1080p").is_ok());
        assert!(validate_profile_name("hd_high-2").is_ok());
        assert!(validate_profile_name("").is_err());
        assert!(validate_profile_name("../etc").is_err());
        assert!(validate_profile_name("a b").is_err());
        assert!(validate_profile_name("..").is_err());
    }
}
