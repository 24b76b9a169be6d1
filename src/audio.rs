//! Audio output: the service contract the player drives, plus the
//! `rodio`-backed implementation used at runtime.

mod output;
mod service;

pub use output::RodioOutput;
pub use service::{AudioError, AudioEvent, AudioOutput, MediaStatus, OutputState};
