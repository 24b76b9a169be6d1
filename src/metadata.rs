//! Tag and stream-property extraction, backed by `lofty`.

use std::path::Path;

use lofty::file::TaggedFileExt;
use lofty::prelude::{Accessor, AudioFile};
use lofty::read_from_path;
use lofty::tag::{ItemKey, Tag};
use log::warn;

/// Metadata for the loaded track. Every tag field is optional; an untagged
/// file is a valid state, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub date: Option<String>,
    /// Raw tag value, possibly `"3/12"` style.
    pub track_number: Option<String>,
    pub genre: Option<String>,
    pub composer: Option<String>,
    pub copyright: Option<String>,
    pub isrc: Option<String>,
    pub duration_secs: f64,
    pub bitrate_kbps: Option<u32>,
    pub sample_rate_hz: Option<u32>,
    pub channels: Option<u8>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn tag_string(tag: &Tag, key: ItemKey) -> Option<String> {
    non_empty(tag.get_string(&key).map(str::to_string))
}

/// Read tags and stream properties from `path`. Unreadable or untagged
/// files degrade to defaults rather than failing.
pub fn read_metadata(path: &Path) -> TrackMetadata {
    let tagged = match read_from_path(path) {
        Ok(t) => t,
        Err(err) => {
            warn!("could not read metadata from {}: {err}", path.display());
            return TrackMetadata::default();
        }
    };

    let mut meta = TrackMetadata::default();

    let properties = tagged.properties();
    meta.duration_secs = properties.duration().as_secs_f64();
    meta.bitrate_kbps = properties.audio_bitrate();
    meta.sample_rate_hz = properties.sample_rate();
    meta.channels = properties.channels();

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        meta.title = non_empty(tag.title().map(|t| t.to_string()));
        meta.artist = non_empty(tag.artist().map(|a| a.to_string()));
        meta.album = non_empty(tag.album().map(|a| a.to_string()));
        meta.date = tag_string(tag, ItemKey::RecordingDate).or_else(|| tag_string(tag, ItemKey::Year));
        meta.track_number = tag_string(tag, ItemKey::TrackNumber);
        meta.genre = tag_string(tag, ItemKey::Genre);
        meta.composer = tag_string(tag, ItemKey::Composer);
        meta.copyright = tag_string(tag, ItemKey::CopyrightMessage);
        meta.isrc = tag_string(tag, ItemKey::Isrc);
    }

    meta
}

/// Embedded cover-art bytes from the first picture of the first tag that
/// carries one.
pub fn read_cover_art(path: &Path) -> Option<Vec<u8>> {
    let tagged = read_from_path(path).ok()?;
    tagged
        .tags()
        .iter()
        .find_map(|tag| tag.pictures().first())
        .map(|picture| picture.data().to_vec())
}

/// Title to show for a track: the tag title when present, the file name
/// otherwise.
pub fn display_title(path: &Path, meta: &TrackMetadata) -> String {
    if let Some(title) = &meta.title {
        return title.clone();
    }
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
