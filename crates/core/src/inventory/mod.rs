//! Stream inventory of the source media.
//!
//! Turns the probe tool's structured output into a [`SourceProbe`]: the
//! source's native video resolution plus its audio and subtitle tracks in
//! source order.

mod error;
mod types;

pub use error::ProbeError;
pub use types::{ProbeReport, ProbeStream, SourceProbe, SourceTrack, TrackKind};

use std::path::Path;
use tracing::{info, warn};

use crate::encoder::Encoder;

/// Probes the input through the encoder and builds its inventory.
pub async fn probe_source<E>(encoder: &E, input: &Path) -> Result<SourceProbe, ProbeError>
where
    E: Encoder + ?Sized,
{
    info!("Probing video metadata for: {}", input.display());
    let output = encoder.probe(input).await?;
    let report = ProbeReport::from_json(&output)?;
    let probe = SourceProbe::from_report(&report);

    match probe.video_resolution {
        Some(res) => info!("Detected input video resolution: {}", res),
        None => warn!("Could not determine input video resolution; no upscale limit applied"),
    }
    info!(
        audio_tracks = probe.audio_tracks.len(),
        subtitle_tracks = probe.subtitle_tracks.len(),
        "Source inventory complete"
    );

    Ok(probe)
}
