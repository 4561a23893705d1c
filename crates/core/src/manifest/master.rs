//! Master playlist composition.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::builder::{BuiltAudioRendition, BuiltSubtitleRendition, BuiltVideoRendition};
use crate::quality::Bitrate;

use super::error::ManifestError;

/// Group id shared by every audio rendition.
pub const AUDIO_GROUP_ID: &str = "audio-aac";
/// Group id shared by every subtitle rendition.
pub const SUBTITLE_GROUP_ID: &str = "subs";
/// File name of the master playlist at the package root.
pub const MASTER_PLAYLIST_NAME: &str = "master.m3u8";

const PLAYLIST_VERSION: u8 = 3;

/// Values the composer takes from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Added to every video bandwidth when audio renditions exist.
    pub audio_bitrate: Bitrate,
    /// `CODECS` attribute advertised for every variant.
    pub codecs: String,
}

/// Advertised bandwidth of a video variant in bits/s.
///
/// One fixed audio bitrate is added when the package has any audio,
/// regardless of how many tracks there are.
pub fn video_bandwidth(video: &BuiltVideoRendition, has_audio: bool, audio_bitrate: &Bitrate) -> u64 {
    let mut bandwidth = video.profile.bitrate.bits_per_second();
    if has_audio {
        bandwidth = bandwidth.saturating_add(audio_bitrate.bits_per_second());
    }
    bandwidth
}

/// Makes a value safe inside a quoted playlist attribute.
fn quoted(value: &str) -> String {
    let escaped: String = value
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect();
    format!("\"{}\"", escaped)
}

fn media_line(
    media_type: &str,
    group_id: &str,
    name: &str,
    language: &str,
    default: bool,
    uri: &str,
) -> String {
    format!(
        "#EXT-X-MEDIA:TYPE={},GROUP-ID={},NAME={},LANGUAGE={},DEFAULT={},AUTOSELECT=YES,URI={}\n",
        media_type,
        quoted(group_id),
        quoted(name),
        quoted(language),
        if default { "YES" } else { "NO" },
        quoted(uri),
    )
}

/// Builds the master playlist text.
///
/// Audio media entries come first (only the first is default), then
/// subtitle entries (never default), then one stream-info/URI pair per video
/// rendition in ascending bandwidth order. Every variant names the audio
/// group; the subtitle group only when subtitles exist. The output depends only on the
/// inputs.
pub fn compose_master_playlist(
    video: &[BuiltVideoRendition],
    audio: &[BuiltAudioRendition],
    subtitles: &[BuiltSubtitleRendition],
    options: &ManifestOptions,
) -> String {
    let mut output = String::new();

    output.push_str("#EXTM3U\n");
    output.push_str(&format!("#EXT-X-VERSION:{}\n", PLAYLIST_VERSION));
    output.push('\n');

    for (i, rendition) in audio.iter().enumerate() {
        output.push_str(&media_line(
            "AUDIO",
            AUDIO_GROUP_ID,
            &rendition.name,
            &rendition.language,
            i == 0,
            &rendition.playlist_path,
        ));
    }
    output.push('\n');

    for rendition in subtitles {
        output.push_str(&media_line(
            "SUBTITLES",
            SUBTITLE_GROUP_ID,
            &rendition.name,
            &rendition.language,
            false,
            &rendition.subtitle_path,
        ));
    }
    output.push('\n');

    let has_audio = !audio.is_empty();
    let mut variants: Vec<(u64, &BuiltVideoRendition)> = video
        .iter()
        .map(|v| (video_bandwidth(v, has_audio, &options.audio_bitrate), v))
        .collect();
    // Stable: equal bandwidths keep build order.
    variants.sort_by_key(|(bandwidth, _)| *bandwidth);

    for (bandwidth, rendition) in variants {
        let mut line = format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={},CODECS={}",
            bandwidth,
            rendition.profile.resolution,
            quoted(&options.codecs),
        );
        line.push_str(&format!(",AUDIO={}", quoted(AUDIO_GROUP_ID)));
        if !subtitles.is_empty() {
            line.push_str(&format!(",SUBTITLES={}", quoted(SUBTITLE_GROUP_ID)));
        }
        output.push_str(&line);
        output.push('\n');
        output.push_str(&rendition.playlist_path);
        output.push('\n');
    }

    output
}

/// Writes `master.m3u8` into the package directory.
///
/// The text goes to a temporary file first and is renamed into place, so a
/// reader never sees a half-written manifest.
pub async fn write_master_playlist(
    package_dir: &Path,
    contents: &str,
) -> Result<PathBuf, ManifestError> {
    let path = package_dir.join(MASTER_PLAYLIST_NAME);
    let temp_path = package_dir.join(format!(".{}.tmp", MASTER_PLAYLIST_NAME));
    info!("Generating master playlist: {}", path.display());

    tokio::fs::write(&temp_path, contents)
        .await
        .map_err(|source| ManifestError::Write {
            path: temp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&temp_path, &path)
        .await
        .map_err(|source| ManifestError::Write {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn options() -> ManifestOptions {
        ManifestOptions {
            audio_bitrate: "128k".parse().unwrap(),
            codecs: "avc1.4D401F,mp4a.40.2".to_string(),
        }
    }

    fn video(name: &str) -> BuiltVideoRendition {
        let profile = fixtures::default_profiles().get(name).unwrap().clone();
        BuiltVideoRendition {
            playlist_path: format!("video_{}/index.m3u8", name),
            profile,
        }
    }

    fn audio(language: &str, index: usize, name: &str) -> BuiltAudioRendition {
        BuiltAudioRendition {
            language: language.to_string(),
            name: name.to_string(),
            playlist_path: format!("audio_{}_{}/index.m3u8", language, index),
        }
    }

    fn subtitle(language: &str, index: usize, name: &str) -> BuiltSubtitleRendition {
        BuiltSubtitleRendition {
            language: language.to_string(),
            name: name.to_string(),
            subtitle_path: format!("sub_{0}_{1}/subtitles_{0}_{1}.vtt", language, index),
        }
    }

    fn bandwidths(playlist: &str) -> Vec<u64> {
        playlist
            .lines()
            .filter_map(|l| l.strip_prefix("#EXT-X-STREAM-INF:BANDWIDTH="))
            .map(|l| l.split(',').next().unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_full_playlist_text() {
        let playlist = compose_master_playlist(
            &[video("360p"), video("144p")],
            &[audio("eng", 0, "English"), audio("spa", 1, "Spanish")],
            &[subtitle("fra", 0, "French")],
            &options(),
        );

        let expected = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"audio-aac\",NAME=\"English\",LANGUAGE=\"eng\",DEFAULT=YES,AUTOSELECT=YES,URI=\"audio_eng_0/index.m3u8\"\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"audio-aac\",NAME=\"Spanish\",LANGUAGE=\"spa\",DEFAULT=NO,AUTOSELECT=YES,URI=\"audio_spa_1/index.m3u8\"\n\
\n\
#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"subs\",NAME=\"French\",LANGUAGE=\"fra\",DEFAULT=NO,AUTOSELECT=YES,URI=\"sub_fra_0/subtitles_fra_0.vtt\"\n\
\n\
#EXT-X-STREAM-INF:BANDWIDTH=428000,RESOLUTION=256x144,CODECS=\"avc1.4D401F,mp4a.40.2\",AUDIO=\"audio-aac\",SUBTITLES=\"subs\"\n\
video_144p/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=928000,RESOLUTION=640x360,CODECS=\"avc1.4D401F,mp4a.40.2\",AUDIO=\"audio-aac\",SUBTITLES=\"subs\"\n\
video_360p/index.m3u8\n";
        assert_eq!(playlist, expected);
    }

    #[test]
    fn test_bandwidth_adds_audio_only_when_present() {
        let with_audio = compose_master_playlist(
            &[video("240p")],
            &[audio("eng", 0, "English")],
            &[],
            &options(),
        );
        assert_eq!(bandwidths(&with_audio), vec![628_000]);

        let without_audio = compose_master_playlist(&[video("240p")], &[], &[], &options());
        assert_eq!(bandwidths(&without_audio), vec![500_000]);
        assert!(without_audio.contains(",AUDIO=\"audio-aac\""));
        assert!(!without_audio.contains("SUBTITLES=\""));
    }

    #[test]
    fn test_bandwidth_saturates_instead_of_overflowing() {
        let mut huge = video("240p");
        huge.profile.bitrate = Bitrate::kbps(u64::MAX / 1_000);
        let audio_bitrate = Bitrate::kbps(u64::MAX / 1_000);
        assert_eq!(video_bandwidth(&huge, true, &audio_bitrate), u64::MAX);
        assert_eq!(
            video_bandwidth(&huge, false, &audio_bitrate),
            (u64::MAX / 1_000) * 1_000
        );
    }

    #[test]
    fn test_video_sorted_by_bandwidth_not_build_order() {
        let mut expensive_low = video("144p");
        expensive_low.profile.bitrate = "5000k".parse().unwrap();

        let playlist = compose_master_playlist(
            &[expensive_low, video("1080p"), video("480p"), video("720p")],
            &[],
            &[],
            &options(),
        );

        let values = bandwidths(&playlist);
        assert_eq!(values, vec![1_200_000, 2_500_000, 4_500_000, 5_000_000]);
        assert!(values.windows(2).all(|w| w[0] < w[1]));

        let uris: Vec<&str> = playlist
            .lines()
            .filter(|l| l.starts_with("video_"))
            .collect();
        assert_eq!(
            uris,
            vec![
                "video_480p/index.m3u8",
                "video_720p/index.m3u8",
                "video_1080p/index.m3u8",
                "video_144p/index.m3u8",
            ]
        );
    }

    #[test]
    fn test_default_flags() {
        let playlist = compose_master_playlist(
            &[video("240p")],
            &[
                audio("eng", 0, "English"),
                audio("deu", 1, "German"),
                audio("ita", 2, "Italian"),
            ],
            &[subtitle("eng", 0, "English"), subtitle("deu", 1, "German")],
            &options(),
        );

        let defaults = playlist
            .lines()
            .filter(|l| l.contains("TYPE=AUDIO") && l.contains("DEFAULT=YES"))
            .count();
        assert_eq!(defaults, 1);
        assert!(playlist
            .lines()
            .filter(|l| l.contains("TYPE=SUBTITLES"))
            .all(|l| l.contains("DEFAULT=NO") && l.contains("AUTOSELECT=YES")));

        let no_audio = compose_master_playlist(&[video("240p")], &[], &[], &options());
        assert!(!no_audio.contains("DEFAULT=YES"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let video = [video("720p"), video("240p")];
        let audio = [audio("eng", 0, "English")];
        let subs = [subtitle("eng", 0, "English")];

        let first = compose_master_playlist(&video, &audio, &subs, &options());
        let second = compose_master_playlist(&video, &audio, &subs, &options());
        assert_eq!(first, second);
    }

    #[test]
    fn test_titles_cannot_break_attributes() {
        let playlist = compose_master_playlist(
            &[video("240p")],
            &[audio("eng", 0, "Director's \"cut\"\ncommentary")],
            &[],
            &options(),
        );
        assert!(playlist.contains("NAME=\"Director's 'cut' commentary\""));
        assert_eq!(playlist.lines().filter(|l| l.contains("TYPE=AUDIO")).count(), 1);
    }

    #[tokio::test]
    async fn test_write_master_playlist() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = write_master_playlist(temp.path(), "#EXTM3U\n").await.unwrap();

        assert_eq!(path, temp.path().join("master.m3u8"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#EXTM3U\n");
        assert!(!temp.path().join(".master.m3u8.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_master_playlist_missing_dir() {
        let result = write_master_playlist(Path::new("/nonexistent/pkg"), "#EXTM3U\n").await;
        assert!(matches!(result, Err(ManifestError::Write { .. })));
    }
}
