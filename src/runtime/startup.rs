use std::path::Path;

use log::warn;

use crate::app::App;
use crate::audio::AudioOutput;
use crate::player::{MAX_SPEED, MIN_SPEED, PlaybackController};
use crate::prefs::{PreferencesStore, keys};

/// Restore playback parameters, the last folder and the last track from
/// the settings file.
pub fn apply_saved_state<A: AudioOutput>(
    app: &mut App,
    controller: &mut PlaybackController<A>,
    prefs: &PreferencesStore,
) {
    let volume = prefs.get_int(keys::VOLUME, 50).clamp(0, 100) as u8;
    let speed = prefs
        .get_int(keys::SPEED, 100)
        .clamp(i64::from(MIN_SPEED), i64::from(MAX_SPEED)) as u16;
    controller.set_volume(volume);
    controller.set_speed(speed);
    // Play-all first: when a hand-edited file enables both, repeat wins.
    controller.set_play_all(prefs.get_bool(keys::PLAY_ALL, false));
    if prefs.get_bool(keys::REPEAT, false) {
        controller.set_repeat(true);
    }
    controller.set_muted(prefs.get_bool(keys::MUTE, false));

    let folder = prefs.get(keys::LAST_FOLDER).to_string();
    if !folder.is_empty() {
        if let Err(err) = app.catalog.set_root(Path::new(&folder)) {
            warn!("remembered folder unavailable: {err}");
            return;
        }
    }

    // Reselect the remembered track when it still exists under the folder.
    let last_track = prefs.get(keys::LAST_TRACK).to_string();
    if !last_track.is_empty() {
        let target = Path::new(&last_track);
        let found = app.catalog.tracks().iter().position(|rel| {
            app.catalog
                .resolve(rel)
                .map(|abs| abs == target)
                .unwrap_or(false)
        });
        if let Some(idx) = found {
            app.selected = idx;
        }
    }
}
