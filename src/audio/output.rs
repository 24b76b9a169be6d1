use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::service::{AudioError, AudioEvent, AudioOutput, MediaStatus, OutputState};

/// `rodio`-backed audio output.
///
/// A fresh paused `Sink` is created for every loaded source. Stopping
/// drops the sink; `play` after a stop decodes the remembered path again,
/// which restarts from position zero. End of media is detected by polling
/// `Sink::empty` from `take_events`.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
    state: OutputState,
    duration: Duration,
    rate: f32,
    gain: f32,
    events: Vec<AudioEvent>,
}

impl RodioOutput {
    pub fn new() -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio chatters on stderr when the stream drops; not under a TUI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            loaded: None,
            state: OutputState::Stopped,
            duration: Duration::ZERO,
            rate: 1.0,
            gain: 0.5,
            events: Vec::new(),
        })
    }

    fn open_sink(&mut self, path: &Path) -> Result<(), AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        self.duration = source.total_duration().unwrap_or(Duration::ZERO);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_speed(self.rate);
        sink.set_volume(self.gain);
        sink.append(source);
        sink.pause();
        self.sink = Some(sink);
        Ok(())
    }

    fn push_state(&mut self, state: OutputState) {
        if self.state != state {
            self.state = state;
            self.events.push(AudioEvent::StateChanged(state));
        }
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.state = OutputState::Stopped;
        self.open_sink(path)?;
        self.loaded = Some(path.to_path_buf());
        self.events.push(AudioEvent::MediaStatus(MediaStatus::Loaded));
        Ok(())
    }

    fn play(&mut self) {
        if self.sink.is_none() {
            let Some(path) = self.loaded.clone() else {
                return;
            };
            if let Err(err) = self.open_sink(&path) {
                warn!("could not reopen {}: {err}", path.display());
                return;
            }
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.push_state(OutputState::Playing);
    }

    fn pause(&mut self) {
        if self.state != OutputState::Playing {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.push_state(OutputState::Paused);
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.push_state(OutputState::Stopped);
    }

    fn seek(&mut self, position_ms: u64) {
        let Some(sink) = &self.sink else {
            // Without a live sink the next play starts from zero anyway.
            debug!("seek with no active sink ignored");
            return;
        };
        if let Err(err) = sink.try_seek(Duration::from_millis(position_ms)) {
            warn!("seek to {position_ms} ms failed: {err}");
        }
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
        if let Some(sink) = &self.sink {
            sink.set_speed(rate);
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        if let Some(sink) = &self.sink {
            sink.set_volume(gain);
        }
    }

    fn position_ms(&self) -> u64 {
        self.sink
            .as_ref()
            .map(|s| s.get_pos().as_millis() as u64)
            .unwrap_or(0)
    }

    fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    fn state(&self) -> OutputState {
        self.state
    }

    fn take_events(&mut self) -> Vec<AudioEvent> {
        // The sink drains asynchronously; an empty sink while nominally
        // playing means the source ran out.
        if self.state == OutputState::Playing
            && self.sink.as_ref().is_some_and(|s| s.empty())
        {
            self.sink = None;
            self.state = OutputState::Stopped;
            self.events
                .push(AudioEvent::MediaStatus(MediaStatus::EndOfMedia));
            self.events
                .push(AudioEvent::StateChanged(OutputState::Stopped));
        }
        std::mem::take(&mut self.events)
    }
}
