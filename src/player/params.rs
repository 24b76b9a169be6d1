/// Lowest selectable playback speed, in percent.
pub const MIN_SPEED: u16 = 50;
/// Highest selectable playback speed, in percent.
pub const MAX_SPEED: u16 = 150;

/// User-adjustable playback parameters.
///
/// Repeat and play-all are mutually exclusive by construction: enabling
/// one disables the other. Muting zeroes the effective gain without
/// touching the stored volume level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackParams {
    volume: u8,
    speed: u16,
    muted: bool,
    repeat: bool,
    play_all: bool,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            volume: 50,
            speed: 100,
            muted: false,
            repeat: false,
            play_all: false,
        }
    }
}

impl PlaybackParams {
    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn play_all(&self) -> bool {
        self.play_all
    }

    /// Volume level, clamped to 0..=100.
    pub fn set_volume(&mut self, level: u8) {
        self.volume = level.min(100);
    }

    /// Speed in percent, clamped to 50..=150.
    pub fn set_speed(&mut self, percent: u16) {
        self.speed = percent.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.repeat = on;
        if on {
            self.play_all = false;
        }
    }

    pub fn set_play_all(&mut self, on: bool) {
        self.play_all = on;
        if on {
            self.repeat = false;
        }
    }

    /// Effective linear gain: `volume / 100`, or zero while muted.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            f32::from(self.volume) / 100.0
        }
    }

    /// Playback rate multiplier derived from the speed percentage.
    pub fn rate(&self) -> f32 {
        f32::from(self.speed) / 100.0
    }
}
