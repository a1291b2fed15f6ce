//! The Directory Session: single owner of what the user is looking at.
//!
//! A session holds the current listing, the pre-search snapshot, the
//! recursive-search path cache and the undo/redo history, and keeps them
//! consistent across provider calls and watch events. It is not thread-safe;
//! callers serialize every request and watch event through one owner (see
//! the daemon's actor).
//!
//! Mutations never edit `files` directly. A successful mutation is expected
//! to be followed by a watch event describing it, which
//! [`DirectorySession::on_watch_event`] reconciles. Where watch delivery is
//! unreliable, [`SessionOptions::reconcile_after_mutation`] re-reads the
//! directory after each mutation instead.

mod dialog;
mod ops;
mod search;
mod view;
mod watch;

use explite_fs::{FileSystemProvider, path::basename};
use explite_protocol::{ColumnLabel, DriveInfo, MediaFile, SessionStatus};
use explite_runtime::{
    HOME, RECYCLE_BIN, Settings, SettingsStore, default_labels, is_sentinel, now_ms,
    recycle_bin_labels,
};
use log::warn;

use crate::{
    history::{HistoryOptions, OperationHistory},
    media::Materializer,
    sort::locale_cmp,
};

pub use dialog::{Dialog, PolicyDialog};
pub use search::SearchCache;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Re-read the current directory after every successful mutation.
    pub reconcile_after_mutation: bool,
    /// Drop redo entries whenever a new operation is recorded.
    pub clear_redo_on_push: bool,
}

pub struct DirectorySession<P, D> {
    provider: P,
    dialog: D,
    materializer: Materializer,
    store: SettingsStore,
    settings: Settings,
    history: OperationHistory,
    options: SessionOptions,

    current_dir: String,
    files: Vec<MediaFile>,
    /// `Some` while a search is active: the unfiltered listing to restore.
    search_backup: Option<Vec<MediaFile>>,
    search_cache: SearchCache,
    search_keyword: String,
    /// Directory currently registered with the provider's watcher.
    watch_target: String,
}

impl<P: FileSystemProvider, D: Dialog> DirectorySession<P, D> {
    pub fn new(provider: P, dialog: D, store: SettingsStore, options: SessionOptions) -> Self {
        let settings = store.load();
        DirectorySession {
            provider,
            dialog,
            materializer: Materializer::default(),
            store,
            settings,
            history: OperationHistory::new(HistoryOptions {
                clear_redo_on_push: options.clear_redo_on_push,
            }),
            options,
            current_dir: HOME.to_string(),
            files: Vec::new(),
            search_backup: None,
            search_cache: SearchCache::default(),
            search_keyword: String::new(),
            watch_target: String::new(),
        }
    }

    pub fn with_materializer(mut self, materializer: Materializer) -> Self {
        self.materializer = materializer;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    pub fn history(&self) -> &OperationHistory {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }

    pub fn search_backup(&self) -> Option<&[MediaFile]> {
        self.search_backup.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.search_backup.is_some()
    }

    pub fn search_keyword(&self) -> &str {
        &self.search_keyword
    }

    pub fn watch_target(&self) -> &str {
        &self.watch_target
    }

    pub fn cached_paths(&self, dir: &str) -> Option<&[String]> {
        self.search_cache.get(dir)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            current_dir: self.current_dir.clone(),
            watch_target: self.watch_target.clone(),
            file_count: self.files.len(),
            searching: self.is_searching(),
            search_key: self.search_keyword.clone(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Remembered column headers for `dir`, else the defaults for its kind.
    pub fn headers(&self, dir: &str) -> Vec<ColumnLabel> {
        if let Some(labels) = self.settings.header_history.labels(dir) {
            return labels.to_vec();
        }
        if dir == RECYCLE_BIN {
            recycle_bin_labels()
        } else {
            default_labels()
        }
    }

    /// Record headers for the current directory.
    pub fn change_columns(&mut self, labels: Vec<ColumnLabel>) {
        let dir = self.current_dir.clone();
        self.settings
            .header_history
            .record_labels(&dir, labels, now_ms());
        self.persist();
    }

    pub fn favorites(&self) -> &[String] {
        &self.settings.favorites
    }

    pub fn add_favorite(&mut self, path: &str) -> bool {
        let added = self.settings.add_favorite(path);
        if added {
            self.persist();
        }
        added
    }

    pub fn remove_favorite(&mut self, path: &str) -> bool {
        let removed = self.settings.remove_favorite(path);
        if removed {
            self.persist();
        }
        removed
    }

    /// Mounted volumes ordered by label.
    pub fn list_volumes(&self) -> Vec<DriveInfo> {
        let volumes = match self.provider.list_volumes() {
            Ok(v) => v,
            Err(e) => {
                self.dialog.show_error(&e.to_string());
                return Vec::new();
            }
        };

        let mut drives: Vec<DriveInfo> = volumes
            .into_iter()
            .map(|v| {
                let name = match basename(&v.mount_point) {
                    n if n.is_empty() => v.mount_point.clone(),
                    n => n,
                };
                DriveInfo {
                    label: if v.volume_label.is_empty() {
                        name.clone()
                    } else {
                        v.volume_label
                    },
                    name,
                    path: v.mount_point,
                    available: v.available_units,
                    total: v.total_units,
                }
            })
            .collect();
        drives.sort_by(|a, b| locale_cmp(&a.label, &b.label));
        drives
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            warn!("Failed to save settings: {e}");
        }
    }

    /// Point the watcher at `dir`, dropping the previous registration.
    fn rewatch(&mut self, dir: &str, recursive: bool) {
        if !self.watch_target.is_empty() && !is_sentinel(&self.watch_target) {
            if let Err(e) = self.provider.unwatch(&self.watch_target) {
                warn!("Failed to unwatch {}: {e}", self.watch_target);
            }
        }

        if !is_sentinel(dir) {
            if let Err(e) = self.provider.watch(dir, recursive) {
                warn!("Failed to watch {dir}: {e}");
            }
        }
        self.watch_target = dir.to_string();
    }
}

#[cfg(all(test, not(windows)))]
mod fixture;
