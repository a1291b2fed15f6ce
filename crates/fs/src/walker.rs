use std::{
    fs::{self, read_dir},
    io::Result,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{debug, warn};

use crate::{mime, record::Dirent, record::FileAttribute};

/// Dirents per channel send.
pub const BATCH_SIZE: usize = 64;

const WORK_POLL: Duration = Duration::from_millis(50);

/// Subtrees the walker neither descends into nor reports.
#[derive(Debug, Default, Clone)]
pub struct WalkContext {
    pub skip_roots: Vec<PathBuf>,
}

impl WalkContext {
    pub fn skips(&self, path: &Path) -> bool {
        self.skip_roots.iter().any(|root| path.starts_with(root))
    }
}

/// Recursive listing of `roots` on `num_threads` workers.
///
/// Directories are shared through a work queue; dirents are batched before
/// being sent on `file_tx`. Returns once every queued directory is scanned.
pub fn walk_parallel(
    roots: Vec<PathBuf>,
    file_tx: Sender<Vec<Dirent>>,
    ctx: Arc<WalkContext>,
    num_threads: usize,
) -> Result<()> {
    let (work_tx, work_rx) = channel::unbounded::<PathBuf>();
    let pending = Arc::new(AtomicUsize::new(roots.len()));

    for root in roots {
        let _ = work_tx.send(root);
    }

    debug!("[walk_parallel] starting with {num_threads} threads");

    thread::scope(|s| {
        for _ in 0..num_threads.max(1) {
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let file_tx = file_tx.clone();
            let ctx = Arc::clone(&ctx);
            let pending = Arc::clone(&pending);

            s.spawn(move || {
                worker_loop(work_rx, work_tx, file_tx, &ctx, &pending);
            });
        }
    });

    Ok(())
}

fn worker_loop(
    work_rx: channel::Receiver<PathBuf>,
    work_tx: channel::Sender<PathBuf>,
    file_tx: Sender<Vec<Dirent>>,
    ctx: &WalkContext,
    pending: &AtomicUsize,
) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    loop {
        match work_rx.recv_timeout(WORK_POLL) {
            Ok(dir) => {
                if let Err(e) = scan_dir_parallel(&dir, &work_tx, &mut batch, ctx, pending) {
                    warn!("[worker] scan_dir_parallel({dir:?}) failed: {e}");
                }
                if batch.len() >= BATCH_SIZE {
                    let to_send = std::mem::take(&mut batch);
                    if file_tx.send(to_send).is_err() {
                        return;
                    }
                }

                if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if pending.load(Ordering::Acquire) == 0 {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if !batch.is_empty() {
        let _ = file_tx.send(batch);
    }
}

/// Scan one directory: queue subdirectories, collect dirents into `batch`.
fn scan_dir_parallel(
    dir: &Path,
    work_tx: &channel::Sender<PathBuf>,
    batch: &mut Vec<Dirent>,
    ctx: &WalkContext,
    pending: &AtomicUsize,
) -> Result<()> {
    let rd = match read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!("[walk] read_dir({dir:?}) failed: {e}");
            return Ok(());
        }
    };

    for entry_res in rd {
        let entry = match entry_res {
            Ok(e) => e,
            Err(e) => {
                warn!("[walk] error reading entry in {dir:?}: {e}");
                continue;
            }
        };

        if ctx.skips(&entry.path()) {
            continue;
        }

        match inspect_fs_entry(&entry) {
            Ok(Some(dirent)) => {
                if should_recurse(&dirent) {
                    pending.fetch_add(1, Ordering::AcqRel);
                    let _ = work_tx.send(entry.path());
                }
                batch.push(dirent);
            }
            Ok(None) => {}
            Err(e) => warn!("[walk] inspect_entry error in {dir:?}: {e}"),
        }
    }

    Ok(())
}

fn should_recurse(d: &Dirent) -> bool {
    d.attributes.is_directory && !d.attributes.is_symbolic_link
}

/// Build a dirent for `entry`; `None` for names that are not valid UTF-8.
pub(crate) fn inspect_fs_entry(entry: &fs::DirEntry) -> Result<Option<Dirent>> {
    let path = entry.path();
    let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
        return Ok(None);
    };
    let Some(full_path) = path.to_str().map(str::to_owned) else {
        return Ok(None);
    };

    let attributes = FileAttribute::from_path(&path)?;
    let parent_path = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = if attributes.is_directory {
        String::new()
    } else {
        mime::guess(&full_path).to_string()
    };

    Ok(Some(Dirent {
        name,
        parent_path,
        full_path,
        mime_type,
        attributes,
    }))
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
