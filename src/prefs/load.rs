use std::env;
use std::path::PathBuf;

/// Settings path: the `MINIPLAYER_SETTINGS_PATH` env var when set, the
/// XDG location otherwise, and a file in the working directory as a last
/// resort.
pub fn resolve_prefs_path() -> PathBuf {
    if let Some(path) = env::var_os("MINIPLAYER_SETTINGS_PATH") {
        return PathBuf::from(path);
    }
    default_prefs_path().unwrap_or_else(|| PathBuf::from("miniplayer.ini"))
}

/// `$XDG_CONFIG_HOME/miniplayer/miniplayer.ini`, falling back to
/// `~/.config/miniplayer/miniplayer.ini`.
pub fn default_prefs_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("miniplayer").join("miniplayer.ini"))
}
