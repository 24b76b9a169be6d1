//! Playback control: parameters, transport state and the end-of-track
//! advance policy, independent of any concrete audio backend.

mod controller;
mod params;

pub use controller::{FADE_STEPS, FADE_TICK, PlaybackController, PlaybackError};
pub use params::{MAX_SPEED, MIN_SPEED, PlaybackParams};

#[cfg(test)]
mod tests;
