use std::path::{Path, PathBuf};

use thiserror::Error;

use super::scan::{self, ScanControl};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("no active folder")]
    NoActiveFolder,
}

/// The active root folder and the tracks discovered under it.
///
/// Tracks are stored as paths relative to the root, in traversal order.
/// The list is immutable between scans and replaced wholesale by a rescan.
#[derive(Debug, Default)]
pub struct TrackCatalog {
    root: Option<PathBuf>,
    tracks: Vec<PathBuf>,
}

impl TrackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the root folder and rescan it.
    pub fn set_root(&mut self, path: &Path) -> Result<(), CatalogError> {
        if !path.is_dir() {
            return Err(CatalogError::NotADirectory(path.to_path_buf()));
        }
        self.root = Some(path.to_path_buf());
        self.rescan();
        Ok(())
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Path> {
        self.tracks.get(index).map(PathBuf::as_path)
    }

    /// Rescan the active root, replacing the track list. Clears the list
    /// when no root is set.
    pub fn rescan(&mut self) {
        self.rescan_with_progress(|_, _| ScanControl::Continue);
    }

    /// Rescan, invoking `progress` with `(found_so_far, total_matching)`
    /// after each discovered file. Returning [`ScanControl::Cancel`] aborts
    /// the walk; tracks found up to that point are kept.
    pub fn rescan_with_progress(&mut self, progress: impl FnMut(usize, usize) -> ScanControl) {
        match self.root.as_deref() {
            Some(root) => self.tracks = scan::scan(root, progress),
            None => self.tracks.clear(),
        }
    }

    /// Mark each track visible or hidden under a case-insensitive substring
    /// match against its relative path. An empty needle matches everything.
    pub fn filter(&self, needle: &str) -> Vec<(&Path, bool)> {
        let needle = needle.to_lowercase();
        self.tracks
            .iter()
            .map(|track| {
                let visible = needle.is_empty()
                    || track.to_string_lossy().to_lowercase().contains(&needle);
                (track.as_path(), visible)
            })
            .collect()
    }

    /// Resolve a relative track path against the active root.
    pub fn resolve(&self, relative: &Path) -> Result<PathBuf, CatalogError> {
        match self.root.as_deref() {
            Some(root) => Ok(root.join(relative)),
            None => Err(CatalogError::NoActiveFolder),
        }
    }
}
