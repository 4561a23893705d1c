//! Encoder bitrate strings such as `500k` or `4.5m`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::QualityError;

/// A bitrate as written in configuration, together with its value in bits/s.
///
/// The original text is what the encoder receives (`-b:v 500k`); the numeric
/// value is what the master playlist advertises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bitrate {
    raw: String,
    bits_per_second: u64,
}

impl Bitrate {
    /// A bitrate written as `<value>k`.
    pub fn kbps(value: u64) -> Self {
        Self {
            raw: format!("{}k", value),
            bits_per_second: value.saturating_mul(1_000),
        }
    }

    /// Returns the value in bits per second.
    pub fn bits_per_second(&self) -> u64 {
        self.bits_per_second
    }

    /// Returns the bitrate exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Largest accepted bitrate, 100 Gbit/s.
pub const MAX_BITS_PER_SECOND: u64 = 100_000_000_000;

/// Converts a bitrate string to bits per second.
///
/// A trailing `k` multiplies by 1000 and a trailing `m` by 1,000,000
/// (case-insensitive, fractional numerals allowed). Anything else must be a
/// plain integer. Values above [`MAX_BITS_PER_SECOND`] are rejected.
pub fn parse_bitrate(value: &str) -> Result<u64, QualityError> {
    let invalid = || QualityError::InvalidBitrate {
        value: value.to_string(),
    };

    let normalized = value.trim().to_ascii_lowercase();
    let (digits, multiplier) = if let Some(n) = normalized.strip_suffix('k') {
        (n, 1_000.0)
    } else if let Some(n) = normalized.strip_suffix('m') {
        (n, 1_000_000.0)
    } else {
        return normalized
            .parse::<u64>()
            .ok()
            .filter(|bps| *bps <= MAX_BITS_PER_SECOND)
            .ok_or_else(invalid);
    };

    let number = digits.trim().parse::<f64>().map_err(|_| invalid())?;
    let bits = number * multiplier;
    if !bits.is_finite() || bits < 0.0 || bits > MAX_BITS_PER_SECOND as f64 {
        return Err(invalid());
    }
    Ok(bits as u64)
}

impl FromStr for Bitrate {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits_per_second = parse_bitrate(s)?;
        Ok(Self {
            raw: s.trim().to_string(),
            bits_per_second,
        })
    }
}

impl TryFrom<String> for Bitrate {
    type Error = QualityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Bitrate> for String {
    fn from(value: Bitrate) -> Self {
        value.raw
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
