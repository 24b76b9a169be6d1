mod app;
mod audio;
mod catalog;
mod metadata;
mod player;
mod prefs;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; under the alternate screen they stay out of the way
    // and become visible once the terminal is restored.
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Warn);
    clog.init();

    runtime::run()
}
