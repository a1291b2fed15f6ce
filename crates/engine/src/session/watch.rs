use std::collections::HashSet;

use explite_fs::{
    FileSystemProvider,
    path::{basename, dirname, is_within},
};
use explite_protocol::{MediaFile, WatchEvent, WatchKind};
use log::{debug, warn};

use super::{Dialog, DirectorySession};
use crate::filter::NameFilter;

impl<P: FileSystemProvider, D: Dialog> DirectorySession<P, D> {
    /// Apply one watcher notification to the listing, the search snapshot
    /// and the search cache, then re-sort the listing.
    pub fn on_watch_event(&mut self, event: &WatchEvent) -> &[MediaFile] {
        debug!(
            "watch {:?}: {:?} -> {:?}",
            event.operation, event.from_paths, event.to_paths
        );

        match event.operation {
            WatchKind::Create => self.apply_create(&event.to_paths),
            WatchKind::Remove => self.apply_remove(&event.to_paths),
            WatchKind::Rename => match (event.from_paths.first(), event.to_paths.first()) {
                (Some(from), Some(to)) => self.apply_rename(from, to),
                _ => warn!("Ignoring rename event without a path pair"),
            },
        }

        self.resort();
        &self.files
    }

    fn apply_create(&mut self, paths: &[String]) {
        if let Some(cached) = self.search_cache.get_mut(&self.current_dir) {
            for p in paths {
                if !cached.contains(p) {
                    cached.push(p.clone());
                }
            }
        }

        if self.search_backup.is_none() {
            for p in paths {
                if let Some(file) = self.materialize(p) {
                    upsert(&mut self.files, file);
                }
            }
            return;
        }

        let filter = NameFilter::new(&self.search_keyword);
        for p in paths {
            let matches = filter.matches(&basename(p));
            let direct_child = dirname(p) == self.current_dir;
            if !matches && !direct_child {
                continue;
            }
            let Some(file) = self.materialize(p) else {
                continue;
            };
            if direct_child {
                if let Some(backup) = self.search_backup.as_mut() {
                    upsert(backup, file.clone());
                }
            }
            if matches {
                upsert(&mut self.files, file);
            }
        }
    }

    fn apply_remove(&mut self, paths: &[String]) {
        let gone: HashSet<&str> = paths.iter().map(String::as_str).collect();

        self.files.retain(|f| !gone.contains(f.full_path.as_str()));
        if let Some(backup) = self.search_backup.as_mut() {
            backup.retain(|f| !gone.contains(f.full_path.as_str()));
        }
        if let Some(cached) = self.search_cache.get_mut(&self.current_dir) {
            cached.retain(|p| !gone.contains(p.as_str()));
        }
    }

    /// A recursive watch reports moves between `current_dir` and its
    /// subfolders as renames, so each view re-checks membership of the new
    /// path: the listing and the snapshot by parent directory, the search
    /// results by the search key.
    fn apply_rename(&mut self, from: &str, to: &str) {
        let renamed = self.materialize(to);
        let direct_child = dirname(to) == self.current_dir;

        match self.search_backup.as_mut() {
            Some(backup) => {
                rename_entry(backup, from, renamed.as_ref(), direct_child);
                let matches = NameFilter::new(&self.search_keyword).matches(&basename(to));
                rename_entry(&mut self.files, from, renamed.as_ref(), matches);
            }
            None => rename_entry(&mut self.files, from, renamed.as_ref(), direct_child),
        }

        let current = self.current_dir.clone();
        if let Some(cached) = self.search_cache.get_mut(&current) {
            cached.retain(|p| p.as_str() != from);
            if is_within(to, &current) && !cached.iter().any(|p| p.as_str() == to) {
                cached.push(to.to_string());
            }
        }
    }

    fn materialize(&self, path: &str) -> Option<MediaFile> {
        match self.materializer.from_path(&self.provider, path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Failed to read {path} for watch event: {e}");
                None
            }
        }
    }
}

/// Replace the entry with the same path, or append.
fn upsert(files: &mut Vec<MediaFile>, file: MediaFile) {
    match files.iter_mut().find(|f| f.full_path == file.full_path) {
        Some(slot) => *slot = file,
        None => files.push(file),
    }
}

/// Move the entry at `from` to its renamed form, keeping its index.
///
/// When the new path does not `belong` to this view, or could not be read,
/// the old entry is dropped. A rename into the view from elsewhere is added.
fn rename_entry(
    files: &mut Vec<MediaFile>,
    from: &str,
    renamed: Option<&MediaFile>,
    belongs: bool,
) {
    let idx = files.iter().position(|f| f.full_path == from);
    match (idx, renamed) {
        (Some(idx), Some(file)) if belongs => files[idx] = file.clone(),
        (Some(idx), _) => {
            files.remove(idx);
        }
        (None, Some(file)) if belongs => upsert(files, file.clone()),
        (None, _) => {}
    }
}

#[cfg(all(test, not(windows)))]
#[path = "watch_tests.rs"]
mod tests;
