//! Track metadata extraction using Lofty.

use std::path::PathBuf;

use anyhow::Result;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

/// What the player panel shows about the current track.
#[derive(Debug, Clone, Default)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Audio properties (bitrate, sample rate, channels), label first.
    pub properties: Vec<(String, String)>,
    /// Total track length in seconds.
    pub duration_secs: u64,
}

impl TrackMetadata {
    /// Lines for the player panel, most important first.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        match (&self.artist, &self.album) {
            (Some(artist), Some(album)) => lines.push(format!("{artist} - {album}")),
            (Some(artist), None) => lines.push(artist.clone()),
            (None, Some(album)) => lines.push(album.clone()),
            (None, None) => {}
        }
        lines.push(String::new());
        for (k, v) in &self.properties {
            lines.push(format!("{k}: {v}"));
        }
        lines
    }
}

/// Load metadata for a file path without touching player state.
/// This is safe to call from a background thread.
pub fn load_metadata(path: PathBuf) -> Result<TrackMetadata> {
    let tagged_file = Probe::open(&path)?.read()?;

    let tag = tagged_file.primary_tag();
    let title = tag.and_then(|t| t.title().map(|s| s.into_owned()));
    let artist = tag.and_then(|t| t.artist().map(|s| s.into_owned()));
    let album = tag.and_then(|t| t.album().map(|s| s.into_owned()));

    let props = tagged_file.properties();
    let mut properties = Vec::new();
    if let Some(b) = props.audio_bitrate() {
        properties.push(("Bitrate (kbps)".into(), b.to_string()));
    }
    if let Some(sr) = props.sample_rate() {
        properties.push(("Sample Rate (Hz)".into(), sr.to_string()));
    }
    if let Some(ch) = props.channels() {
        properties.push(("Channels".into(), ch.to_string()));
    }

    Ok(TrackMetadata {
        title: title.or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        }),
        artist,
        album,
        properties,
        duration_secs: props.duration().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lines_join_artist_and_album() {
        let meta = TrackMetadata {
            title: Some("Song".into()),
            artist: Some("Band".into()),
            album: Some("Record".into()),
            properties: vec![("Channels".into(), "2".into())],
            duration_secs: 61,
        };
        assert_eq!(
            meta.display_lines(),
            vec!["Song", "Band - Record", "", "Channels: 2"]
        );
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(load_metadata(PathBuf::from("/no/such/track.flac")).is_err());
    }
}
