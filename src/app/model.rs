//! Application model: the `App` struct holds the track catalog, cursor
//! selection, filter state and the UI-facing track metadata.

use std::path::PathBuf;

use crate::catalog::TrackCatalog;
use crate::metadata::TrackMetadata;

/// The main application model.
pub struct App {
    pub catalog: TrackCatalog,
    /// Cursor position as a catalog index.
    pub selected: usize,

    pub follow_playback: bool,
    pub filter_mode: bool,
    pub filter_query: String,

    /// Metadata of the loaded track, refreshed by the runtime when the
    /// loaded track changes.
    pub metadata: TrackMetadata,
    /// Size in bytes of the loaded track's embedded cover art, if any.
    pub cover_art_bytes: Option<usize>,
    /// Path the metadata was read from.
    pub metadata_path: Option<PathBuf>,

    /// Transient non-fatal warning shown in the status line.
    pub status_message: Option<String>,
    pub metadata_window: bool,
}

impl App {
    pub fn new(catalog: TrackCatalog) -> Self {
        Self {
            catalog,
            selected: 0,
            follow_playback: true,
            filter_mode: false,
            filter_query: String::new(),
            metadata: TrackMetadata::default(),
            cover_art_bytes: None,
            metadata_path: None,
            status_message: None,
            metadata_window: false,
        }
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// Catalog indices currently visible, honoring the active filter.
    pub fn display_indices(&self) -> Vec<usize> {
        self.catalog
            .filter(self.filter_query.trim())
            .iter()
            .enumerate()
            .filter(|(_, (_, visible))| *visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Enable following playback (cursor follows the playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Set the selected catalog index and ensure it is visible.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move the cursor to the next visible track. Does not wrap.
    pub fn next(&mut self) {
        let display = self.display_indices();
        if let Some(pos) = display.iter().position(|&i| i == self.selected) {
            if pos + 1 < display.len() {
                self.selected = display[pos + 1];
            }
        } else if let Some(&first) = display.first() {
            self.selected = first;
        }
    }

    /// Move the cursor to the previous visible track. Does not wrap.
    pub fn prev(&mut self) {
        let display = self.display_indices();
        if let Some(pos) = display.iter().position(|&i| i == self.selected) {
            if pos > 0 {
                self.selected = display[pos - 1];
            }
        } else if let Some(&first) = display.first() {
            self.selected = first;
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Enter filter mode: typed characters narrow the list.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Keep `selected` inside the visible set, falling back to the first
    /// visible track.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }
        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }
}
