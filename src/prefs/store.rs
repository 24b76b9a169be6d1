use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// Section header of the settings file.
const SECTION: &str = "Settings";

/// Key names understood by the store.
pub mod keys {
    pub const VOLUME: &str = "volume";
    pub const SPEED: &str = "speed";
    pub const REPEAT: &str = "repeat";
    pub const MUTE: &str = "mute";
    pub const PLAY_ALL: &str = "play_all";
    pub const LAST_FOLDER: &str = "last_folder";
    pub const LAST_TRACK: &str = "last_track";
}

/// Known keys with their defaults. `save` always writes exactly this set,
/// in this order; unknown keys found on disk are dropped.
const KNOWN_KEYS: [(&str, &str); 7] = [
    (keys::VOLUME, "50"),
    (keys::SPEED, "100"),
    (keys::REPEAT, "False"),
    (keys::MUTE, "False"),
    (keys::PLAY_ALL, "False"),
    (keys::LAST_FOLDER, ""),
    (keys::LAST_TRACK, ""),
];

/// Flat INI-style settings file with a single `[Settings]` section.
///
/// Loading is lenient: a missing or malformed file yields defaults, and
/// individual values that fail to parse fall back per accessor. Saving
/// rewrites the file from scratch.
#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

fn defaults() -> BTreeMap<String, String> {
    KNOWN_KEYS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl PreferencesStore {
    /// Load settings from `path`, falling back to defaults for anything
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let mut store = Self {
            path: path.to_path_buf(),
            values: defaults(),
        };
        match fs::read_to_string(path) {
            Ok(text) => store.parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not read settings from {}: {err}", path.display()),
        }
        store
    }

    fn parse(&mut self, text: &str) {
        let mut in_section = false;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_section = name.trim() == SECTION;
                continue;
            }
            if !in_section {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_ascii_lowercase();
                if KNOWN_KEYS.iter().any(|(k, _)| *k == key) {
                    self.values.insert(key, value.trim().to_string());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Integer value of `key`, or `fallback` when absent or unparseable.
    pub fn get_int(&self, key: &str, fallback: i64) -> i64 {
        self.get(key).trim().parse().unwrap_or(fallback)
    }

    /// Boolean value of `key`. Accepts `true/yes/1/on` and `false/no/0/off`
    /// in any case; anything else yields `fallback`.
    pub fn get_bool(&self, key: &str, fallback: bool) -> bool {
        match self.get(key).trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => true,
            "false" | "no" | "0" | "off" => false,
            _ => fallback,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, &value.to_string());
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, if value { "True" } else { "False" });
    }

    /// Rewrite the settings file with the full known-key set.
    pub fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut out = String::new();
        out.push_str(&format!("[{SECTION}]\n"));
        for (key, _) in KNOWN_KEYS {
            out.push_str(&format!("{key} = {}\n", self.get(key)));
        }
        fs::write(&self.path, out)
    }
}
