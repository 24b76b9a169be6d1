use log::error;

use crate::app::App;
use crate::audio::AudioOutput;
use crate::player::PlaybackController;
use crate::prefs::{PreferencesStore, keys};

/// Capture the current session into the store and rewrite the settings
/// file. Called after every mutating user action and at shutdown.
pub fn flush<A: AudioOutput>(
    prefs: &mut PreferencesStore,
    app: &App,
    controller: &PlaybackController<A>,
) {
    let params = controller.params();
    prefs.set_int(keys::VOLUME, i64::from(params.volume()));
    prefs.set_int(keys::SPEED, i64::from(params.speed()));
    prefs.set_bool(keys::REPEAT, params.repeat());
    prefs.set_bool(keys::MUTE, params.muted());
    prefs.set_bool(keys::PLAY_ALL, params.play_all());

    let folder = app
        .catalog
        .root()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    prefs.set(keys::LAST_FOLDER, &folder);

    let track = controller
        .loaded_track()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    prefs.set(keys::LAST_TRACK, &track);

    if let Err(err) = prefs.save() {
        error!("failed to save settings: {err}");
    }
}
