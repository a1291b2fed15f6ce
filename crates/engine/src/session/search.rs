use std::collections::{HashMap, VecDeque};

use explite_fs::{FileSystemProvider, path::{basename, join}};
use explite_protocol::{MediaFile, SearchResult};
use explite_runtime::{RECYCLE_BIN, SEARCH_CACHE_CAP, is_sentinel};
use log::{debug, info, warn};

use super::{Dialog, DirectorySession};
use crate::{filter::NameFilter, sort::sort_files};

/// Flat path lists from recursive listings, keyed by search root.
///
/// Holds at most [`SEARCH_CACHE_CAP`] roots; the oldest listing goes first.
#[derive(Debug, Default)]
pub struct SearchCache {
    paths: HashMap<String, Vec<String>>,
    order: VecDeque<String>,
}

impl SearchCache {
    pub fn get(&self, dir: &str) -> Option<&[String]> {
        self.paths.get(dir).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, dir: &str) -> Option<&mut Vec<String>> {
        self.paths.get_mut(dir)
    }

    pub fn insert(&mut self, dir: &str, paths: Vec<String>) {
        if self.paths.insert(dir.to_string(), paths).is_none() {
            self.order.push_back(dir.to_string());
        }
        while self.order.len() > SEARCH_CACHE_CAP {
            if let Some(oldest) = self.order.pop_front() {
                self.paths.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<P: FileSystemProvider, D: Dialog> DirectorySession<P, D> {
    /// Filter everything under `dir` by `key`.
    ///
    /// The first search after an idle period snapshots the listing and
    /// switches the watcher to recursive mode; later ones reuse both.
    pub fn search(&mut self, dir: &str, key: &str) -> SearchResult {
        if self.search_backup.is_none() {
            debug!("search started in {}", self.current_dir);
            self.search_backup = Some(self.files.clone());
            if !is_sentinel(&self.current_dir) {
                let current = self.current_dir.clone();
                self.rewatch(&current, true);
            }
        }
        self.search_keyword = key.to_string();

        let filter = NameFilter::new(key);
        let mut files = if dir == RECYCLE_BIN {
            self.search_backup
                .iter()
                .flatten()
                .filter(|f| filter.matches(&f.name))
                .cloned()
                .collect()
        } else {
            self.search_tree(dir, &filter)
        };

        sort_files(&mut files, self.effective_sort(dir));
        info!("search {dir:?} for {key:?}: {} hit(s)", files.len());
        self.files = files;
        SearchResult {
            files: self.files.clone(),
        }
    }

    fn search_tree(&mut self, dir: &str, filter: &NameFilter) -> Vec<MediaFile> {
        if self.search_cache.get(dir).is_none() {
            match self.provider.readdir(dir, true) {
                Ok(entries) => {
                    let paths = entries
                        .iter()
                        .filter(|d| !d.attributes.is_system)
                        .map(|d| join(&[d.parent_path.as_str(), d.name.as_str()]))
                        .collect();
                    self.search_cache.insert(dir, paths);
                }
                Err(e) => {
                    self.dialog.show_error(&e.to_string());
                    return Vec::new();
                }
            }
        }

        let hits: Vec<String> = self
            .search_cache
            .get(dir)
            .unwrap_or_default()
            .iter()
            .filter(|p| filter.matches(&basename(p)))
            .cloned()
            .collect();

        hits.iter()
            .filter_map(|p| match self.materializer.from_path(&self.provider, p) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("Skipping search hit {p}: {e}");
                    None
                }
            })
            .collect()
    }

    /// Restore the pre-search listing.
    ///
    /// A `temporary` end (a refresh in the middle of a search) keeps the
    /// recursive watch in place.
    pub fn end_search(&mut self, temporary: bool) -> SearchResult {
        if let Some(backup) = self.search_backup.take() {
            debug!("search ended in {} (temporary: {temporary})", self.current_dir);
            self.files = backup;
            self.resort();
            self.search_keyword.clear();

            if !temporary && !is_sentinel(&self.current_dir) {
                let current = self.current_dir.clone();
                self.rewatch(&current, false);
            }
        }
        SearchResult {
            files: self.files.clone(),
        }
    }
}

#[cfg(all(test, not(windows)))]
#[path = "search_tests.rs"]
mod tests;
