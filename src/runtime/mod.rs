use std::env;
use std::path::Path;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::warn;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioOutput;
use crate::catalog::TrackCatalog;
use crate::player::PlaybackController;
use crate::prefs::{PreferencesStore, resolve_prefs_path};

mod event_loop;
mod persist;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let prefs_path = resolve_prefs_path();
    let mut prefs = PreferencesStore::load(&prefs_path);

    let output = RodioOutput::new()?;
    let mut controller = PlaybackController::new(output);
    let mut app = App::new(TrackCatalog::new());

    startup::apply_saved_state(&mut app, &mut controller, &prefs);

    // A folder on the command line overrides the remembered one.
    if let Some(dir) = env::args().nth(1) {
        if let Err(err) = app.catalog.set_root(Path::new(&dir)) {
            warn!("cannot open {dir}: {err}");
        } else {
            app.selected = 0;
        }
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut app, &mut controller, &mut prefs);

    // Whatever happened in the loop, settings are flushed on the way out.
    persist::flush(&mut prefs, &app, &controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
