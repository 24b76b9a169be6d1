mod load;
mod store;

pub use load::{default_prefs_path, resolve_prefs_path};
pub use store::{PreferencesStore, keys};
