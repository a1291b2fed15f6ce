use std::{
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use explite_protocol::WatchEvent;
use log::{debug, warn};
use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};

use crate::error::{ProviderError, Result};

/// How long a rename source waits for its destination before it is
/// reported as a removal (moved out of the watched tree).
pub const RENAME_PAIR_WINDOW: Duration = Duration::from_millis(50);

/// Single-target directory watcher that turns raw notifications into
/// [`WatchEvent`]s on a caller-supplied channel.
pub struct DirWatcher {
    events: Sender<WatchEvent>,
    active: Mutex<Option<ActiveWatch>>,
}

struct ActiveWatch {
    path: String,
    // Dropping the watcher closes the raw channel, which ends the translator.
    _watcher: RecommendedWatcher,
}

impl DirWatcher {
    pub fn new(events: Sender<WatchEvent>) -> Self {
        DirWatcher {
            events,
            active: Mutex::new(None),
        }
    }

    pub fn watch(&self, path: &str, recursive: bool) -> Result<()> {
        let (raw_tx, raw_rx) = channel::unbounded::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = raw_tx.send(res);
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(Path::new(path), mode)?;

        let events = self.events.clone();
        thread::Builder::new()
            .name("explite-watch".into())
            .spawn(move || translate_loop(raw_rx, events))
            .map_err(|e| ProviderError::io(path, e))?;

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = Some(ActiveWatch {
            path: path.to_string(),
            _watcher: watcher,
        });
        debug!("watching {path} (recursive: {recursive})");
        Ok(())
    }

    pub fn unwatch(&self, path: &str) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|a| a.path == path) {
            *active = None;
            debug!("stopped watching {path}");
        }
    }

    pub fn target(&self) -> Option<String> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|a| a.path.clone())
    }
}

fn translate_loop(raw_rx: Receiver<notify::Result<Event>>, events: Sender<WatchEvent>) {
    let mut translator = EventTranslator::default();

    loop {
        let out = match raw_rx.recv_timeout(RENAME_PAIR_WINDOW) {
            Ok(Ok(event)) => translator.on_event(event),
            Ok(Err(e)) => {
                warn!("watch error: {e}");
                continue;
            }
            Err(RecvTimeoutError::Timeout) => translator.flush(),
            Err(RecvTimeoutError::Disconnected) => {
                for ev in translator.flush() {
                    let _ = events.send(ev);
                }
                return;
            }
        };

        for ev in out {
            if events.send(ev).is_err() {
                return;
            }
        }
    }
}

fn lossy(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// Pairs rename halves and maps notify kinds onto create/remove/rename.
#[derive(Default)]
pub(crate) struct EventTranslator {
    pending_from: Option<(String, Instant)>,
    /// Last pair emitted from separate halves, so a trailing combined
    /// notification for the same rename is not reported twice.
    last_rename: Option<(String, String)>,
}

impl EventTranslator {
    pub(crate) fn on_event(&mut self, event: Event) -> Vec<WatchEvent> {
        let mut out = self.flush_expired();
        let mut paths: Vec<String> = event.paths.iter().map(|p| lossy(p)).collect();

        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                out.extend(self.flush());
                if let Some(from) = paths.pop() {
                    self.pending_from = Some((from, Instant::now()));
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                let Some(to) = paths.pop() else {
                    return out;
                };
                match self.pending_from.take() {
                    Some((from, _)) => {
                        self.last_rename = Some((from.clone(), to.clone()));
                        out.push(WatchEvent::rename(from, to));
                    }
                    None => out.push(WatchEvent::create(vec![to])),
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
                let to = paths.pop().unwrap_or_default();
                let from = paths.pop().unwrap_or_default();
                let pair = (from, to);
                if self.last_rename.as_ref() == Some(&pair) {
                    self.last_rename = None;
                } else {
                    out.extend(self.flush());
                    out.push(WatchEvent::rename(pair.0, pair.1));
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => {
                // Backends that cannot tell the halves apart.
                out.extend(self.flush());
                for p in paths {
                    if PathBuf::from(&p).exists() {
                        out.push(WatchEvent::create(vec![p]));
                    } else {
                        out.push(WatchEvent::remove(vec![p]));
                    }
                }
            }
            EventKind::Create(_) if !paths.is_empty() => {
                out.extend(self.flush());
                out.push(WatchEvent::create(paths));
            }
            EventKind::Remove(_) if !paths.is_empty() => {
                out.extend(self.flush());
                out.push(WatchEvent::remove(paths));
            }
            _ => {}
        }

        out
    }

    /// Report an unpaired rename source as removed.
    pub(crate) fn flush(&mut self) -> Vec<WatchEvent> {
        match self.pending_from.take() {
            Some((from, _)) => vec![WatchEvent::remove(vec![from])],
            None => Vec::new(),
        }
    }

    fn flush_expired(&mut self) -> Vec<WatchEvent> {
        let expired = self
            .pending_from
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > RENAME_PAIR_WINDOW);
        if expired { self.flush() } else { Vec::new() }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
