//! Shared setup for session tests.

use explite_fs::MemoryProvider;
use explite_protocol::MediaFile;
use explite_runtime::SettingsStore;

use super::{DirectorySession, PolicyDialog, SessionOptions};
use crate::media::{Labels, Materializer, Platform};

pub type TestSession = DirectorySession<MemoryProvider, PolicyDialog>;

pub fn session(fs: MemoryProvider) -> TestSession {
    session_with(fs, SessionOptions::default())
}

pub fn session_with(fs: MemoryProvider, options: SessionOptions) -> TestSession {
    DirectorySession::new(fs, PolicyDialog::new(), SettingsStore::in_memory(), options)
        .with_materializer(Materializer::new(Labels::default(), Platform::Posix))
}

pub fn names(files: &[MediaFile]) -> Vec<&str> {
    files.iter().map(|f| f.name.as_str()).collect()
}

/// Deliver every queued watch event, in order.
pub fn pump(session: &mut TestSession) {
    for event in session.provider().take_events() {
        session.on_watch_event(&event);
    }
}

pub fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
