use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extensions recognized as playable audio (case-insensitive).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["mp3", "flac", "wav", "ogg"];

/// Verdict returned by a scan progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Cancel,
}

pub(super) fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|s| *s == ext)
        })
        .unwrap_or(false)
}

/// Walk `root` recursively and collect relative paths of supported audio
/// files. Order is filesystem traversal order, not sorted.
///
/// `progress` receives `(found_so_far, total)`; the total comes from a
/// counting pre-pass over the same walk.
pub(super) fn scan(
    root: &Path,
    mut progress: impl FnMut(usize, usize) -> ScanControl,
) -> Vec<PathBuf> {
    let total = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path()))
        .count();

    let mut tracks = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path) {
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            tracks.push(relative);
            if progress(tracks.len(), total) == ScanControl::Cancel {
                break;
            }
        }
    }
    tracks
}
