use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime, TimeZone};
use log::{debug, warn};

use crate::helpers::{move_path, remove_path};

const INFO_EXT: &str = "trashinfo";
const INFO_HEADER: &str = "[Trash Info]";
const DELETION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A recycle bin in the freedesktop.org layout:
/// `<root>/files/<name>` holds the item, `<root>/info/<name>.trashinfo`
/// records where it came from and when.
#[derive(Debug, Clone)]
pub struct TrashStore {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    /// Name under `files/`, unique within the bin.
    pub name: String,
    pub stored_path: PathBuf,
    pub info_path: PathBuf,
    pub original_path: String,
    /// Local deletion time truncated to seconds, epoch milliseconds.
    pub deleted_ms: i64,
}

impl TrashStore {
    pub fn new(root: PathBuf) -> Self {
        let root = root.canonicalize().unwrap_or(root);
        TrashStore { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    fn info_dir(&self) -> PathBuf {
        self.root.join("info")
    }

    #[inline]
    pub fn is_in_trash(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Move `path` into the bin.
    pub fn trash(&self, path: &Path) -> io::Result<TrashEntry> {
        let original_path = path.to_string_lossy().into_owned();
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
            })?;

        // Missing sources fail before anything is written.
        fs::symlink_metadata(path)?;

        fs::create_dir_all(self.files_dir())?;
        fs::create_dir_all(self.info_dir())?;

        let deleted_at = Local::now().naive_local();
        let (name, info_path, mut info) = self.reserve_name(&base)?;
        let body = format!(
            "{INFO_HEADER}\nPath={}\nDeletionDate={}\n",
            encode_path(&original_path),
            deleted_at.format(DELETION_DATE_FORMAT),
        );
        info.write_all(body.as_bytes())?;

        let stored_path = self.files_dir().join(&name);
        if let Err(e) = move_path(path, &stored_path) {
            let _ = fs::remove_file(&info_path);
            return Err(e);
        }

        debug!("trashed {original_path} as {name}");
        Ok(TrashEntry {
            name,
            stored_path,
            info_path,
            original_path,
            deleted_ms: local_to_ms(&truncate_to_secs(deleted_at)),
        })
    }

    /// Claim a free name by creating its info file exclusively.
    fn reserve_name(&self, base: &str) -> io::Result<(String, PathBuf, fs::File)> {
        for n in 1.. {
            let name = if n == 1 {
                base.to_string()
            } else {
                format!("{base}.{n}")
            };
            if fs::symlink_metadata(self.files_dir().join(&name)).is_ok() {
                continue;
            }

            let info_path = self.info_dir().join(format!("{name}.{INFO_EXT}"));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&info_path)
            {
                Ok(file) => return Ok((name, info_path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        unreachable!("unbounded name search")
    }

    /// Every entry with both an info file and a stored item, newest first.
    pub fn entries(&self) -> io::Result<Vec<TrashEntry>> {
        let rd = match fs::read_dir(self.info_dir()) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for entry in rd {
            let info_path = entry?.path();
            if info_path.extension().and_then(|e| e.to_str()) != Some(INFO_EXT) {
                continue;
            }
            let Some(name) = info_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_owned)
            else {
                continue;
            };

            let stored_path = self.files_dir().join(&name);
            if fs::symlink_metadata(&stored_path).is_err() {
                debug!("skipping orphaned trash info {info_path:?}");
                continue;
            }

            let text = match fs::read_to_string(&info_path) {
                Ok(t) => t,
                Err(e) => {
                    warn!("unreadable trash info {info_path:?}: {e}");
                    continue;
                }
            };
            let Some((original_path, deleted_ms)) = parse_trash_info(&text) else {
                warn!("malformed trash info {info_path:?}");
                continue;
            };

            entries.push(TrashEntry {
                name,
                stored_path,
                info_path,
                original_path,
                deleted_ms,
            });
        }

        entries.sort_by(|a, b| {
            b.deleted_ms
                .cmp(&a.deleted_ms)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    /// Move an entry back to its original location.
    pub fn restore(&self, entry: &TrashEntry) -> io::Result<()> {
        let target = Path::new(&entry.original_path);
        if fs::symlink_metadata(target).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", entry.original_path),
            ));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        move_path(&entry.stored_path, target)?;
        fs::remove_file(&entry.info_path)?;
        debug!("restored {}", entry.original_path);
        Ok(())
    }

    pub fn purge(&self, entry: &TrashEntry) -> io::Result<()> {
        remove_path(&entry.stored_path)?;
        fs::remove_file(&entry.info_path)
    }

    /// Purge everything; returns how many entries were removed.
    pub fn empty(&self) -> io::Result<usize> {
        let entries = self.entries()?;
        for entry in &entries {
            self.purge(entry)?;
        }
        Ok(entries.len())
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|c| urlencoding::encode(c).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `(original path, deletion time ms)` from a `.trashinfo` body.
pub(crate) fn parse_trash_info(text: &str) -> Option<(String, i64)> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next()? != INFO_HEADER {
        return None;
    }

    let mut original = None;
    let mut deleted_ms = 0;
    for line in lines {
        if let Some(v) = line.strip_prefix("Path=") {
            original = urlencoding::decode(v).ok().map(|s| s.into_owned());
        } else if let Some(v) = line.strip_prefix("DeletionDate=") {
            deleted_ms = NaiveDateTime::parse_from_str(v, DELETION_DATE_FORMAT)
                .map(|dt| local_to_ms(&dt))
                .unwrap_or(0);
        }
    }

    original.map(|p| (p, deleted_ms))
}

fn truncate_to_secs(dt: NaiveDateTime) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(
        &dt.format(DELETION_DATE_FORMAT).to_string(),
        DELETION_DATE_FORMAT,
    )
    .unwrap_or(dt)
}

fn local_to_ms(dt: &NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(dt)
        .earliest()
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "trash_tests.rs"]
mod tests;
