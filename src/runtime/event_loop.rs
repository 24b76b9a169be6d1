use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::warn;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{OutputState, RodioOutput};
use crate::metadata::{self, TrackMetadata};
use crate::player::{FADE_TICK, MAX_SPEED, MIN_SPEED, PlaybackController};
use crate::prefs::PreferencesStore;
use crate::runtime::persist;
use crate::ui::{self, PlaybackView};

/// Step for the speed nudge keys, in percent.
const SPEED_STEP: u16 = 10;
/// Step for the volume nudge keys.
const VOLUME_STEP: u8 = 5;
/// Seek distance for the arrow keys.
const SEEK_STEP_MS: u64 = 5_000;

/// State tracked by the runtime event loop across iterations.
struct EventLoopState {
    last_tick: Instant,
    /// Path the metadata pane currently shows.
    last_loaded: Option<PathBuf>,
    marquee_offset: usize,
}

impl EventLoopState {
    fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            last_loaded: None,
            marquee_offset: 0,
        }
    }
}

/// Main terminal event loop: drains audio notifications, steps the fade,
/// refreshes metadata, draws the UI and handles input. Returns `Ok(())`
/// when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    controller: &mut PlaybackController<RodioOutput>,
    prefs: &mut PreferencesStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::new();

    loop {
        controller.poll(&app.catalog);

        if state.last_tick.elapsed() >= FADE_TICK {
            controller.tick();
            state.marquee_offset = state.marquee_offset.wrapping_add(1);
            state.last_tick = Instant::now();
        }

        // Follow the playing track with the cursor.
        if app.follow_playback && !app.filter_mode {
            if let Some(idx) = controller.selection() {
                if app.selected != idx {
                    app.set_selected(idx);
                }
            }
        }

        refresh_metadata(app, controller, &mut state);

        let display = app.display_indices();
        let view = playback_view(app, controller, &state);
        terminal.draw(|f| ui::draw(f, app, &display, &view))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.filter_mode {
            match key.code {
                KeyCode::Esc => app.clear_filter(),
                KeyCode::Backspace => app.pop_filter_char(),
                KeyCode::Down => app.next(),
                KeyCode::Up => app.prev(),
                KeyCode::Enter => {
                    if !app.display_indices().is_empty() {
                        app.exit_filter_mode();
                        app.follow_playback_on();
                        play_selected(app, controller, prefs);
                    }
                }
                KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('/') => app.enter_filter_mode(),
            KeyCode::Char('j') | KeyCode::Down => {
                app.follow_playback_off();
                app.next();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.follow_playback_off();
                app.prev();
            }
            KeyCode::Enter => {
                if app.has_tracks() {
                    app.follow_playback_on();
                    play_selected(app, controller, prefs);
                }
            }
            KeyCode::Char(' ') => {
                match controller.state() {
                    OutputState::Playing => controller.pause(),
                    OutputState::Paused => controller.play(),
                    OutputState::Stopped => {
                        if app.has_tracks() {
                            app.follow_playback_on();
                            play_selected(app, controller, prefs);
                        }
                    }
                }
            }
            KeyCode::Char('l') => skip(app, controller, prefs, 1),
            KeyCode::Char('h') => skip(app, controller, prefs, -1),
            KeyCode::Char('m') => {
                controller.set_muted(!controller.params().muted());
                persist::flush(prefs, app, controller);
            }
            KeyCode::Char('r') => {
                controller.set_repeat(!controller.params().repeat());
                persist::flush(prefs, app, controller);
            }
            KeyCode::Char('a') => {
                controller.set_play_all(!controller.params().play_all());
                persist::flush(prefs, app, controller);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let speed = (controller.params().speed() + SPEED_STEP).min(MAX_SPEED);
                controller.set_speed(speed);
                persist::flush(prefs, app, controller);
            }
            KeyCode::Char('-') => {
                let speed = controller
                    .params()
                    .speed()
                    .saturating_sub(SPEED_STEP)
                    .max(MIN_SPEED);
                controller.set_speed(speed);
                persist::flush(prefs, app, controller);
            }
            KeyCode::Char(']') => {
                let volume = controller.params().volume().saturating_add(VOLUME_STEP);
                controller.set_volume(volume);
                persist::flush(prefs, app, controller);
            }
            KeyCode::Char('[') => {
                let volume = controller.params().volume().saturating_sub(VOLUME_STEP);
                controller.set_volume(volume);
                persist::flush(prefs, app, controller);
            }
            KeyCode::Right => {
                let pos = controller.position_ms().saturating_add(SEEK_STEP_MS);
                controller.seek(pos.min(controller.duration_ms()));
            }
            KeyCode::Left => {
                controller.seek(controller.position_ms().saturating_sub(SEEK_STEP_MS));
            }
            KeyCode::Esc => {
                // Reset: fade to silence, stop, rewind to the beginning.
                controller.fade_out_then_stop();
                controller.seek(0);
            }
            KeyCode::Char('K') => app.toggle_metadata_window(),
            _ => {}
        }
    }
}

/// Reload the metadata pane when the loaded track changes.
fn refresh_metadata(
    app: &mut App,
    controller: &PlaybackController<RodioOutput>,
    state: &mut EventLoopState,
) {
    let loaded = controller.loaded_track().map(|p| p.to_path_buf());
    if loaded == state.last_loaded {
        return;
    }
    match &loaded {
        Some(path) => {
            app.metadata = metadata::read_metadata(path);
            app.cover_art_bytes = metadata::read_cover_art(path).map(|b| b.len());
        }
        None => {
            app.metadata = TrackMetadata::default();
            app.cover_art_bytes = None;
        }
    }
    app.metadata_path = loaded.clone();
    state.marquee_offset = 0;
    state.last_loaded = loaded;
}

fn playback_view(
    app: &App,
    controller: &PlaybackController<RodioOutput>,
    state: &EventLoopState,
) -> PlaybackView {
    let params = controller.params();
    let title = controller
        .loaded_track()
        .map(|p| metadata::display_title(p, &app.metadata))
        .unwrap_or_default();
    PlaybackView {
        state: controller.state(),
        title,
        position_ms: controller.position_ms(),
        duration_ms: controller.duration_ms(),
        volume: params.volume(),
        muted: params.muted(),
        speed: params.speed(),
        repeat: params.repeat(),
        play_all: params.play_all(),
        fading: controller.is_fading(),
        marquee_offset: state.marquee_offset,
    }
}

/// Play the track under the cursor, surfacing failures in the status line.
fn play_selected(
    app: &mut App,
    controller: &mut PlaybackController<RodioOutput>,
    prefs: &mut PreferencesStore,
) {
    match controller.play_track(&app.catalog, app.selected) {
        Ok(()) => {
            app.status_message = None;
            persist::flush(prefs, app, controller);
        }
        Err(err) => {
            warn!("{err}");
            app.status_message = Some(err.to_string());
        }
    }
}

/// Move the cursor by one track. When playback is active the new track
/// starts playing; otherwise only the cursor moves.
fn skip(
    app: &mut App,
    controller: &mut PlaybackController<RodioOutput>,
    prefs: &mut PreferencesStore,
    delta: i64,
) {
    let display = app.display_indices();
    if display.is_empty() {
        return;
    }
    let pos = display
        .iter()
        .position(|&i| i == app.selected)
        .unwrap_or(0);
    let new_pos = if delta >= 0 {
        (pos + 1).min(display.len() - 1)
    } else {
        pos.saturating_sub(1)
    };
    if new_pos == pos {
        return;
    }
    app.follow_playback_on();
    app.set_selected(display[new_pos]);
    if controller.state() != OutputState::Stopped {
        play_selected(app, controller, prefs);
    }
}
