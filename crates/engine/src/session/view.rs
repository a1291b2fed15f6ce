use explite_fs::FileSystemProvider;
use explite_protocol::{LoadEvent, MediaFile, Navigation, SortResult, SortType};
use explite_runtime::{HOME, RECYCLE_BIN, is_sentinel, now_ms};
use log::{debug, info};

use super::{Dialog, DirectorySession};
use crate::{error::SessionError, sort::sort_files};

impl<P: FileSystemProvider, D: Dialog> DirectorySession<P, D> {
    /// Navigate to `path`. Returns `None` when it does not exist.
    pub fn open(&mut self, path: &str, navigation: Navigation) -> Option<LoadEvent> {
        if !is_sentinel(path) && !self.provider.exists(path) {
            self.dialog
                .show_error(&SessionError::NotFound(path.to_string()).to_string());
            return None;
        }

        if path != self.current_dir && self.is_searching() {
            self.end_search(false);
        }
        Some(self.read_files(path, navigation))
    }

    /// Re-read the current directory, ending any search temporarily.
    pub fn reload(&mut self) -> LoadEvent {
        if self.is_searching() {
            self.end_search(true);
        }
        let dir = self.current_dir.clone();
        self.read_files(&dir, Navigation::Reload)
    }

    /// List `dir`, make it current and watch it. Moving to another
    /// directory drops the search cache.
    ///
    /// On failure the previous view is left untouched and the event is
    /// flagged `failed` with the default sort.
    pub fn read_files(&mut self, dir: &str, navigation: Navigation) -> LoadEvent {
        let listed = match dir {
            HOME => Ok(Vec::new()),
            RECYCLE_BIN => self.list_recycle_bin(),
            _ => self.list_dir(dir),
        };

        let mut files = match listed {
            Ok(files) => files,
            Err(e) => {
                self.dialog.show_error(&e.to_string());
                return LoadEvent {
                    files: Vec::new(),
                    directory: dir.to_string(),
                    navigation,
                    sort_type: SortType::default(),
                    failed: true,
                    headers: self.headers(dir),
                };
            }
        };

        let sort_type = match dir {
            HOME => SortType::default(),
            _ => self.effective_sort(dir),
        };
        sort_files(&mut files, sort_type);
        debug!("read {} entries from {dir}", files.len());

        if dir != self.current_dir {
            self.search_cache.clear();
        }
        self.rewatch(dir, false);
        self.current_dir = dir.to_string();
        self.files = files;

        LoadEvent {
            files: self.files.clone(),
            directory: dir.to_string(),
            navigation,
            sort_type,
            failed: false,
            headers: self.headers(dir),
        }
    }

    fn list_dir(&self, dir: &str) -> Result<Vec<MediaFile>, SessionError> {
        Ok(self
            .provider
            .readdir(dir, false)?
            .iter()
            .filter(|d| !d.attributes.is_system)
            .map(|d| self.materializer.from_dirent(d))
            .collect())
    }

    fn list_recycle_bin(&self) -> Result<Vec<MediaFile>, SessionError> {
        Ok(self
            .provider
            .read_recycle_bin()?
            .iter()
            .map(|item| self.materializer.from_recycle_item(item))
            .collect())
    }

    /// The remembered sort for `dir`, else the default.
    pub fn effective_sort(&self, dir: &str) -> SortType {
        self.settings
            .header_history
            .sort_type(dir)
            .unwrap_or_default()
    }

    /// Sort the visible files of `dir`.
    ///
    /// An explicit `sort_type` is remembered for `dir` first, so it is also
    /// the sort that gets applied.
    pub fn sort(&mut self, dir: &str, sort_type: Option<SortType>) -> SortResult {
        if let Some(sort_type) = sort_type {
            info!("sort {dir} by {} asc={}", sort_type.key.as_str(), sort_type.asc);
            self.settings
                .header_history
                .record_sort(dir, sort_type, now_ms());
            self.persist();
        }

        let sort_type = self.effective_sort(dir);
        if dir == self.current_dir {
            sort_files(&mut self.files, sort_type);
        }
        SortResult {
            files: self.files.clone(),
            sort_type,
        }
    }

    pub(super) fn resort(&mut self) {
        let sort_type = self.effective_sort(&self.current_dir);
        sort_files(&mut self.files, sort_type);
    }

    /// Bring `files` back in line after a mutation when watch events are
    /// not relied upon. Skipped during a search, where the listing is a
    /// filtered view.
    pub(super) fn after_mutation(&mut self) {
        if !self.options.reconcile_after_mutation || self.is_searching() || self.current_dir == HOME {
            return;
        }
        debug!("reconciling {} after mutation", self.current_dir);
        let dir = self.current_dir.clone();
        self.read_files(&dir, Navigation::Reload);
    }
}

#[cfg(all(test, not(windows)))]
#[path = "view_tests.rs"]
mod tests;
