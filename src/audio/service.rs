use std::path::{Path, PathBuf};

use thiserror::Error;

/// Lifecycle state reported by the audio-output service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Media status notifications pushed by the audio-output service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    /// A new source finished loading.
    Loaded,
    /// The current source played to its natural end.
    EndOfMedia,
}

/// Asynchronous notification from the audio-output service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    StateChanged(OutputState),
    MediaStatus(MediaStatus),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },
}

/// Command and query surface of the audio-output service.
///
/// Commands are fire-and-forget; their effects are observed through the
/// queries and through notifications drained with [`take_events`]. All
/// calls happen on the UI thread.
///
/// [`take_events`]: AudioOutput::take_events
pub trait AudioOutput {
    /// Load `path` as the current source, replacing any previous one.
    /// Loading leaves the output stopped at position zero.
    fn load(&mut self, path: &Path) -> Result<(), AudioError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position_ms: u64);
    /// Playback rate as a multiplier (1.0 is normal speed).
    fn set_rate(&mut self, rate: f32);
    /// Linear gain in `[0.0, 1.0]`.
    fn set_gain(&mut self, gain: f32);

    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
    fn state(&self) -> OutputState;

    /// Drain pending notifications, in arrival order.
    fn take_events(&mut self) -> Vec<AudioEvent>;
}
