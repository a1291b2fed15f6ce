use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crossbeam::channel::{self, Sender};
use explite_protocol::{UndeleteItem, WatchEvent};
use log::{debug, warn};

use crate::{
    error::{ProviderError, Result},
    helpers::{copy_recursively, move_path, remove_path},
    mime,
    path::{basename, is_within, join},
    provider::FileSystemProvider,
    record::{Dirent, FileAttribute, RecycleBinItem, Volume},
    trash::{TrashEntry, TrashStore},
    walker::{WalkContext, inspect_fs_entry, walk_parallel},
    watcher::DirWatcher,
};

/// Provider backed by the host filesystem.
pub struct LocalProvider {
    trash: TrashStore,
    watcher: DirWatcher,
    walk_threads: usize,
}

impl LocalProvider {
    /// Watch notifications are delivered on `events`.
    pub fn new(trash_root: PathBuf, events: Sender<WatchEvent>) -> Self {
        let walk_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        LocalProvider {
            trash: TrashStore::new(trash_root),
            watcher: DirWatcher::new(events),
            walk_threads,
        }
    }

    pub fn with_walk_threads(mut self, n: usize) -> Self {
        self.walk_threads = n.max(1);
        self
    }

    pub fn trash_root(&self) -> &Path {
        self.trash.root()
    }

    fn read_children(&self, dir: &str) -> Result<Vec<Dirent>> {
        let rd = fs::read_dir(dir).map_err(|e| ProviderError::io(dir, e))?;
        let mut out = Vec::new();
        for entry in rd {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("error reading entry in {dir}: {e}");
                    continue;
                }
            };
            match inspect_fs_entry(&entry) {
                Ok(Some(d)) => out.push(d),
                Ok(None) => debug!("skipping non UTF-8 name in {dir}"),
                Err(e) => warn!("cannot stat {:?}: {e}", entry.path()),
            }
        }
        Ok(out)
    }

    fn read_tree(&self, dir: &str) -> Result<Vec<Dirent>> {
        if !Path::new(dir).is_dir() {
            return Err(ProviderError::NotFound(dir.to_string()));
        }

        let ctx = Arc::new(WalkContext {
            skip_roots: vec![self.trash.root().to_path_buf()],
        });
        let (tx, rx) = channel::unbounded::<Vec<Dirent>>();
        walk_parallel(vec![PathBuf::from(dir)], tx, ctx, self.walk_threads)
            .map_err(|e| ProviderError::io(dir, e))?;

        Ok(rx.into_iter().flatten().collect())
    }

    /// Destination inside `to` for `src`, rejecting self-targets.
    fn destination(src: &str, to: &str) -> Result<String> {
        let name = basename(src);
        if name.is_empty() {
            return Err(ProviderError::InvalidInput(format!("cannot place \"{src}\"")));
        }
        if is_within(to, src) {
            return Err(ProviderError::InvalidInput(format!(
                "cannot place \"{src}\" inside itself"
            )));
        }
        Ok(join(&[to, name.as_str()]))
    }

    fn transfer(
        &self,
        from: &[String],
        to: &str,
        op: fn(&Path, &Path) -> std::io::Result<()>,
    ) -> Result<()> {
        if !Path::new(to).is_dir() {
            return Err(ProviderError::NotFound(to.to_string()));
        }

        for src in from {
            let dest = Self::destination(src, to)?;
            if !self.exists(src) {
                return Err(ProviderError::NotFound(src.clone()));
            }
            if self.exists(&dest) {
                // Overwrite was confirmed by the caller.
                remove_path(Path::new(&dest)).map_err(|e| ProviderError::io(&dest, e))?;
            }
            op(Path::new(src), Path::new(&dest)).map_err(|e| ProviderError::io(src, e))?;
        }
        Ok(())
    }

    fn take_matching(
        entries: &mut Vec<TrashEntry>,
        pred: impl Fn(&TrashEntry) -> bool,
    ) -> Option<TrashEntry> {
        // Entries are newest first, so the first hit is the latest deletion.
        let idx = entries.iter().position(pred)?;
        Some(entries.remove(idx))
    }

    fn trash_entries(&self) -> Result<Vec<TrashEntry>> {
        self.trash
            .entries()
            .map_err(|e| ProviderError::io(self.trash.root().to_string_lossy(), e))
    }

    fn entry_for(entries: &mut Vec<TrashEntry>, item: &UndeleteItem) -> Result<TrashEntry> {
        Self::take_matching(entries, |e| {
            e.original_path == item.original_path && e.deleted_ms == item.deleted_time_ms
        })
        .ok_or_else(|| ProviderError::NotFound(item.original_path.clone()))
    }
}

impl FileSystemProvider for LocalProvider {
    fn readdir(&self, dir: &str, recursive: bool) -> Result<Vec<Dirent>> {
        if recursive {
            self.read_tree(dir)
        } else {
            self.read_children(dir)
        }
    }

    fn stat(&self, path: &str) -> Result<FileAttribute> {
        FileAttribute::from_path(Path::new(path)).map_err(|e| ProviderError::io(path, e))
    }

    fn mime_type(&self, path: &str) -> Result<String> {
        if self.stat(path)?.is_directory {
            return Ok(String::new());
        }
        Ok(mime::guess(path).to_string())
    }

    fn exists(&self, path: &str) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        if !self.exists(old_path) {
            return Err(ProviderError::NotFound(old_path.to_string()));
        }
        if self.exists(new_path) {
            return Err(ProviderError::AlreadyExists(new_path.to_string()));
        }
        fs::rename(old_path, new_path).map_err(|e| ProviderError::io(old_path, e))
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        fs::create_dir(path).map_err(|e| ProviderError::io(path, e))
    }

    fn mkdir_all(&self, path: &str) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| ProviderError::io(path, e))
    }

    fn create(&self, path: &str) -> Result<()> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| ProviderError::io(path, e))
    }

    fn copy(&self, from: &[String], to: &str) -> Result<()> {
        self.transfer(from, to, copy_recursively)
    }

    fn move_items(&self, from: &[String], to: &str) -> Result<()> {
        self.transfer(from, to, move_path)
    }

    fn trash(&self, paths: &[String]) -> Result<()> {
        for p in paths {
            self.trash
                .trash(Path::new(p))
                .map_err(|e| ProviderError::io(p, e))?;
        }
        Ok(())
    }

    fn delete(&self, paths: &[String]) -> Result<()> {
        for p in paths {
            remove_path(Path::new(p)).map_err(|e| ProviderError::io(p, e))?;
        }
        Ok(())
    }

    fn undelete(&self, original_paths: &[String]) -> Result<()> {
        let mut entries = self.trash_entries()?;
        for p in original_paths {
            let entry = Self::take_matching(&mut entries, |e| &e.original_path == p)
                .ok_or_else(|| ProviderError::NotFound(p.clone()))?;
            self.trash.restore(&entry).map_err(|e| ProviderError::io(p, e))?;
        }
        Ok(())
    }

    fn undelete_by_time(&self, items: &[UndeleteItem]) -> Result<()> {
        let mut entries = self.trash_entries()?;
        for item in items {
            let entry = Self::entry_for(&mut entries, item)?;
            self.trash
                .restore(&entry)
                .map_err(|e| ProviderError::io(&item.original_path, e))?;
        }
        Ok(())
    }

    fn delete_from_recycle_bin(&self, items: &[UndeleteItem]) -> Result<()> {
        let mut entries = self.trash_entries()?;
        for item in items {
            let entry = Self::entry_for(&mut entries, item)?;
            self.trash
                .purge(&entry)
                .map_err(|e| ProviderError::io(&item.original_path, e))?;
        }
        Ok(())
    }

    fn read_recycle_bin(&self) -> Result<Vec<RecycleBinItem>> {
        let entries = self.trash_entries()?;
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let attributes = match FileAttribute::from_path(&entry.stored_path) {
                Ok(a) => a,
                Err(e) => {
                    warn!("cannot stat trashed {:?}: {e}", entry.stored_path);
                    continue;
                }
            };
            let mime_type = if attributes.is_directory {
                String::new()
            } else {
                mime::guess(&entry.original_path).to_string()
            };
            items.push(RecycleBinItem {
                name: basename(&entry.original_path),
                full_path: entry.stored_path.to_string_lossy().into_owned(),
                original_path: entry.original_path,
                deleted_date_ms: entry.deleted_ms,
                mime_type,
                attributes,
            });
        }
        Ok(items)
    }

    fn empty_recycle_bin(&self) -> Result<()> {
        let n = self
            .trash
            .empty()
            .map_err(|e| ProviderError::io(self.trash.root().to_string_lossy(), e))?;
        debug!("emptied recycle bin ({n} items)");
        Ok(())
    }

    fn watch(&self, path: &str, recursive: bool) -> Result<()> {
        self.watcher.watch(path, recursive)
    }

    fn unwatch(&self, path: &str) -> Result<()> {
        self.watcher.unwatch(path);
        Ok(())
    }

    fn list_volumes(&self) -> Result<Vec<Volume>> {
        let mut volumes = Vec::new();
        for (device, mount_point) in mount_points() {
            match (
                fs2::available_space(&mount_point),
                fs2::total_space(&mount_point),
            ) {
                (Ok(available_units), Ok(total_units)) => volumes.push(Volume {
                    volume_label: volume_label(&device, &mount_point),
                    mount_point,
                    available_units,
                    total_units,
                }),
                (Err(e), _) | (_, Err(e)) => debug!("skipping volume {mount_point}: {e}"),
            }
        }
        Ok(volumes)
    }
}

fn volume_label(device: &str, mount_point: &str) -> String {
    let name = basename(mount_point);
    if !name.is_empty() {
        return name;
    }
    basename(device)
}

#[cfg(target_os = "linux")]
fn mount_points() -> Vec<(String, String)> {
    match fs::read_to_string("/proc/mounts") {
        Ok(text) => parse_mounts(&text),
        Err(e) => {
            warn!("cannot read /proc/mounts: {e}");
            vec![(String::new(), "/".to_string())]
        }
    }
}

#[cfg(windows)]
fn mount_points() -> Vec<(String, String)> {
    (b'A'..=b'Z')
        .map(|letter| format!("{}:\\", letter as char))
        .filter(|root| Path::new(root).exists())
        .map(|root| (root.clone(), root))
        .collect()
}

#[cfg(not(any(target_os = "linux", windows)))]
fn mount_points() -> Vec<(String, String)> {
    vec![(String::new(), "/".to_string())]
}

/// Block-device mounts from a `/proc/mounts` body, first mount wins.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn parse_mounts(text: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(mount_point)) = (fields.next(), fields.next()) else {
            continue;
        };
        if !device.starts_with("/dev/") || device.starts_with("/dev/loop") {
            continue;
        }
        let mount_point = unescape_mount_field(mount_point);
        if out.iter().any(|(_, mp)| *mp == mount_point) {
            continue;
        }
        out.push((device.to_string(), mount_point));
    }
    out
}

/// Decode the `\NNN` octal escapes the kernel uses for spaces and tabs.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escape = bytes.get(i + 1..i + 4).filter(|d| {
            bytes[i] == b'\\' && d.iter().all(|b| (b'0'..=b'7').contains(b))
        });
        match escape {
            Some(digits) => {
                let code = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                out.push(code as u8);
                i += 4;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
