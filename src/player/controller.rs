use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use thiserror::Error;

use crate::audio::{AudioError, AudioEvent, AudioOutput, MediaStatus, OutputState};
use crate::catalog::{CatalogError, TrackCatalog};

use super::params::PlaybackParams;

/// Number of gain steps in a fade-out.
pub const FADE_STEPS: u8 = 10;
/// Width of one fade step; ten steps make the 500 ms fade.
pub const FADE_TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("cannot find {0}")]
    TrackMissing(PathBuf),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Output(#[from] AudioError),
}

/// Which notification channel handled the last end of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinishChannel {
    StateChange,
    MediaStatus,
}

#[derive(Debug)]
struct Fade {
    /// Effective gain when the fade began; restored after the stop.
    baseline: f32,
    steps_left: u8,
}

/// Drives an [`AudioOutput`] service: owns the playback parameters, the
/// loaded-track selection, the fade-out stepper and the end-of-track
/// advance policy.
///
/// The service reports the end of a track on two channels, a state change
/// to `Stopped` and an `EndOfMedia` media status, and may deliver either
/// or both in any order. An end handled on one channel absorbs the next
/// notification arriving on the other; repeated notifications on the same
/// channel are each handled on their own.
pub struct PlaybackController<A: AudioOutput> {
    output: A,
    params: PlaybackParams,
    state: OutputState,
    loaded: Option<PathBuf>,
    selection: Option<usize>,
    suppress_auto_advance: bool,
    fade: Option<Fade>,
    finished_on: Option<FinishChannel>,
}

impl<A: AudioOutput> PlaybackController<A> {
    pub fn new(output: A) -> Self {
        Self {
            output,
            params: PlaybackParams::default(),
            state: OutputState::Stopped,
            loaded: None,
            selection: None,
            suppress_auto_advance: false,
            fade: None,
            finished_on: None,
        }
    }

    pub fn params(&self) -> &PlaybackParams {
        &self.params
    }

    #[cfg(test)]
    pub(super) fn output_mut(&mut self) -> &mut A {
        &mut self.output
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Absolute path of the loaded track, if any.
    pub fn loaded_track(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    /// Catalog index of the loaded track.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn position_ms(&self) -> u64 {
        self.output.position_ms()
    }

    pub fn duration_ms(&self) -> u64 {
        self.output.duration_ms()
    }

    /// Load the catalog track at `index` without starting playback.
    /// A file that vanished since the scan is a non-fatal error; nothing
    /// about the current playback changes.
    pub fn load(&mut self, catalog: &TrackCatalog, index: usize) -> Result<(), PlaybackError> {
        let Some(relative) = catalog.track(index) else {
            return Ok(());
        };
        let absolute = catalog.resolve(relative)?;
        if !absolute.exists() {
            return Err(PlaybackError::TrackMissing(absolute));
        }
        self.output.load(&absolute)?;
        self.loaded = Some(absolute);
        self.selection = Some(index);
        self.finished_on = None;
        Ok(())
    }

    /// User track change: stop whatever is playing, then load and play the
    /// catalog track at `index`.
    pub fn play_track(&mut self, catalog: &TrackCatalog, index: usize) -> Result<(), PlaybackError> {
        if self.state != OutputState::Stopped {
            self.suppress_auto_advance = true;
            self.output.stop();
            self.state = OutputState::Stopped;
        }
        self.load(catalog, index)?;
        self.play();
        Ok(())
    }

    /// Start or resume playback of the loaded track, applying the current
    /// rate and gain first. No-op when nothing is loaded.
    pub fn play(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.output.set_rate(self.params.rate());
        self.output.set_gain(self.params.gain());
        self.output.play();
        self.state = OutputState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state != OutputState::Playing {
            return;
        }
        self.output.pause();
        self.state = OutputState::Paused;
    }

    /// Deliberate stop. Flags the stop so the resulting service
    /// notification is not mistaken for a natural end of track.
    pub fn stop(&mut self) {
        if self.state == OutputState::Stopped {
            return;
        }
        self.suppress_auto_advance = true;
        self.output.stop();
        self.state = OutputState::Stopped;
    }

    pub fn seek(&mut self, position_ms: u64) {
        if self.loaded.is_some() {
            self.output.seek(position_ms);
        }
    }

    /// Update the speed. A playing track changes rate immediately; a
    /// paused or stopped one picks the rate up on the next play.
    pub fn set_speed(&mut self, percent: u16) {
        self.params.set_speed(percent);
        if self.state == OutputState::Playing {
            self.output.set_rate(self.params.rate());
        }
    }

    /// Update the stored volume. The effective gain only follows while
    /// not muted and not mid-fade.
    pub fn set_volume(&mut self, level: u8) {
        self.params.set_volume(level);
        if !self.params.muted() && self.fade.is_none() {
            self.output.set_gain(self.params.gain());
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.params.set_muted(muted);
        if self.fade.is_none() {
            self.output.set_gain(self.params.gain());
        }
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.params.set_repeat(on);
    }

    pub fn set_play_all(&mut self, on: bool) {
        self.params.set_play_all(on);
    }

    /// Begin a fade to silence followed by a stop. No-op while stopped or
    /// when a fade is already in flight. The fade advances on [`tick`];
    /// the caller's timer cadence defines the step width.
    ///
    /// [`tick`]: PlaybackController::tick
    pub fn fade_out_then_stop(&mut self) {
        if self.state == OutputState::Stopped || self.fade.is_some() {
            return;
        }
        self.fade = Some(Fade {
            baseline: self.params.gain(),
            steps_left: FADE_STEPS,
        });
    }

    /// Advance one timer tick. Steps the gain down linearly; the final
    /// tick stops the output and restores the pre-fade gain so the next
    /// play is audible.
    pub fn tick(&mut self) {
        let Some(mut fade) = self.fade.take() else {
            return;
        };
        fade.steps_left -= 1;
        if fade.steps_left == 0 {
            self.output.set_gain(0.0);
            self.suppress_auto_advance = true;
            self.output.stop();
            self.state = OutputState::Stopped;
            self.output.set_gain(fade.baseline);
        } else {
            let gain = fade.baseline * f32::from(fade.steps_left) / f32::from(FADE_STEPS);
            self.output.set_gain(gain);
            self.fade = Some(fade);
        }
    }

    /// Drain service notifications and dispatch them.
    pub fn poll(&mut self, catalog: &TrackCatalog) {
        for event in self.output.take_events() {
            match event {
                AudioEvent::StateChanged(state) => self.handle_state_changed(state, catalog),
                AudioEvent::MediaStatus(status) => self.handle_media_status(status, catalog),
            }
        }
    }

    /// React to a service state change. A change to `Stopped` that was not
    /// deliberately requested is treated as a natural end when the
    /// reported position reached the duration.
    pub fn handle_state_changed(&mut self, new_state: OutputState, catalog: &TrackCatalog) {
        if new_state != OutputState::Stopped {
            self.state = new_state;
            return;
        }
        if self.suppress_auto_advance {
            self.suppress_auto_advance = false;
            self.state = OutputState::Stopped;
            return;
        }
        if self.absorb_companion(FinishChannel::StateChange) {
            return;
        }
        self.state = OutputState::Stopped;

        self.finished_on = Some(FinishChannel::StateChange);
        self.finish_track(catalog, true);
    }

    /// React to a media status notification. Only `EndOfMedia` matters.
    pub fn handle_media_status(&mut self, status: MediaStatus, catalog: &TrackCatalog) {
        if status != MediaStatus::EndOfMedia {
            return;
        }
        if self.suppress_auto_advance {
            self.suppress_auto_advance = false;
            return;
        }
        if self.absorb_companion(FinishChannel::MediaStatus) {
            return;
        }
        self.finished_on = Some(FinishChannel::MediaStatus);
        self.finish_track(catalog, false);
    }

    /// True when `channel` is reporting an end already handled on the
    /// other channel; the stale notification is swallowed.
    fn absorb_companion(&mut self, channel: FinishChannel) -> bool {
        match self.finished_on {
            Some(handled) if handled != channel => {
                self.finished_on = None;
                true
            }
            _ => false,
        }
    }

    /// End-of-track policy: repeat, then play-all, then settle.
    ///
    /// `require_end_position` gates the repeat branch on the position
    /// having reached the duration, for the channel where a bare stop is
    /// ambiguous.
    fn finish_track(&mut self, catalog: &TrackCatalog, require_end_position: bool) {
        if self.params.repeat() && self.loaded.is_some() {
            let at_end = !require_end_position || {
                let duration = self.output.duration_ms();
                duration > 0 && self.output.position_ms() >= duration
            };
            if at_end {
                self.output.seek(0);
                self.play();
                return;
            }
        }
        if self.params.play_all() {
            if let Some(next) = self
                .selection
                .map(|i| i + 1)
                .filter(|&i| i < catalog.len())
            {
                match self.load(catalog, next) {
                    Ok(()) => {
                        // load clears finished_on; keep it so the companion
                        // notification for the old track is still absorbed.
                        self.finished_on = Some(if require_end_position {
                            FinishChannel::StateChange
                        } else {
                            FinishChannel::MediaStatus
                        });
                        self.play();
                        return;
                    }
                    Err(err) => warn!("auto-advance failed: {err}"),
                }
            }
        }
        // End of the line: settle, keeping the track loaded.
        self.state = OutputState::Stopped;
    }
}
