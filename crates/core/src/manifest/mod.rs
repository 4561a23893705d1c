//! Master playlist assembly.
//!
//! Serializes the built rendition set into `master.m3u8`: media groups for
//! audio and subtitles, then one `#EXT-X-STREAM-INF` per video rendition.

mod error;
mod master;

pub use error::ManifestError;
pub use master::{
    compose_master_playlist, video_bandwidth, write_master_playlist, ManifestOptions,
    AUDIO_GROUP_ID, MASTER_PLAYLIST_NAME, SUBTITLE_GROUP_ID,
};
