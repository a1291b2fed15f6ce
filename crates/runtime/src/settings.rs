use std::{
    collections::HashMap,
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use explite_protocol::{ColumnLabel, SortType};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{SORT_HISTORY_CAP, default_settings_path};

pub const SETTINGS_DISABLED_ENV: &str = "EXPLITE_SETTINGS";

/// Remembered view preferences for one directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderSetting {
    /// Last time this entry was written, epoch milliseconds.
    pub time_ms: i64,
    pub sort_type: SortType,
    #[serde(default)]
    pub labels: Vec<ColumnLabel>,
}

/// Per-directory sort/column history, bounded by [`SORT_HISTORY_CAP`].
///
/// When a new directory would push the map past the cap, the single entry
/// with the oldest `time_ms` is evicted. Updating an existing directory never
/// evicts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortHistory {
    entries: HashMap<String, HeaderSetting>,
}

impl SortHistory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, dir: &str) -> Option<&HeaderSetting> {
        self.entries.get(dir)
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.entries.contains_key(dir)
    }

    pub fn sort_type(&self, dir: &str) -> Option<SortType> {
        self.entries.get(dir).map(|e| e.sort_type)
    }

    pub fn labels(&self, dir: &str) -> Option<&[ColumnLabel]> {
        self.entries
            .get(dir)
            .map(|e| e.labels.as_slice())
            .filter(|labels| !labels.is_empty())
    }

    pub fn record_sort(&mut self, dir: &str, sort_type: SortType, time_ms: i64) {
        self.make_room_for(dir);
        let entry = self
            .entries
            .entry(dir.to_string())
            .or_insert_with(|| HeaderSetting {
                time_ms,
                sort_type,
                labels: Vec::new(),
            });
        entry.time_ms = time_ms;
        entry.sort_type = sort_type;
    }

    pub fn record_labels(&mut self, dir: &str, labels: Vec<ColumnLabel>, time_ms: i64) {
        self.make_room_for(dir);
        let entry = self
            .entries
            .entry(dir.to_string())
            .or_insert_with(|| HeaderSetting {
                time_ms,
                sort_type: SortType::default(),
                labels: Vec::new(),
            });
        entry.time_ms = time_ms;
        entry.labels = labels;
    }

    fn make_room_for(&mut self, dir: &str) {
        if self.entries.contains_key(dir) || self.entries.len() < SORT_HISTORY_CAP {
            return;
        }

        // Ties broken by key so eviction is deterministic.
        let oldest = self
            .entries
            .iter()
            .min_by(|a, b| a.1.time_ms.cmp(&b.1.time_ms).then_with(|| a.0.cmp(b.0)))
            .map(|(k, _)| k.clone());

        if let Some(key) = oldest {
            debug!("sort history full, evicting {key}");
            self.entries.remove(&key);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            x: 0,
            y: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bounds: Bounds,
    pub is_maximized: bool,
    pub favorites: Vec<String>,
    pub left_area_width: u32,
    pub header_history: SortHistory,
    pub theme: Theme,
    pub allow_move_column: bool,
    pub remember_columns: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            is_maximized: false,
            favorites: Vec::new(),
            left_area_width: 0,
            header_history: SortHistory::default(),
            theme: Theme::System,
            allow_move_column: true,
            remember_columns: true,
        }
    }
}

impl Settings {
    /// Returns false when the path was already a favorite.
    pub fn add_favorite(&mut self, path: &str) -> bool {
        if self.favorites.iter().any(|f| f == path) {
            return false;
        }
        self.favorites.push(path.to_string());
        true
    }

    pub fn remove_favorite(&mut self, path: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f != path);
        before != self.favorites.len()
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn settings_disabled() -> bool {
    match env::var(SETTINGS_DISABLED_ENV) {
        Ok(val) => val == "0" || val.eq_ignore_ascii_case("false"),
        Err(_) => false,
    }
}

/// JSON-file persistence for [`Settings`].
pub struct SettingsStore {
    /// `None` keeps everything in memory.
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// Store at the default location, or in-memory when disabled by env.
    pub fn new() -> Self {
        if settings_disabled() {
            return Self::in_memory();
        }
        Self::with_path(default_settings_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Missing or unreadable files yield defaults.
    pub fn load(&self) -> Settings {
        let Some(path) = &self.path else {
            return Settings::default();
        };

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!("Failed to read settings at {}: {e}", path.display());
                return Settings::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed settings at {}: {e}", path.display());
                Settings::default()
            }
        }
    }

    /// Write atomically: temp file in the same directory, then rename.
    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
