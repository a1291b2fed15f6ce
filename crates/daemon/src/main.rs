mod actor;
mod config;
mod dispatch;
mod rpc;

use std::path::Path;

use anyhow::Context;
use crossbeam::channel;
use explite_engine::{DirectorySession, PolicyDialog};
use explite_fs::LocalProvider;
use explite_protocol::Navigation;
use explite_runtime::{SettingsStore, logging};
use log::{info, warn};

use config::DaemonConfig;

fn main() -> anyhow::Result<()> {
    let config = DaemonConfig::from_env()?;

    match &config.log_file {
        Some(path) => logging::init_with_file(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => {
            logging::init().ok();
        }
    }

    info!(
        "Starting explite daemon: start={}, socket={}, trash={}",
        config.start_dir.display(),
        config.socket_path.display(),
        config.trash_dir.display(),
    );

    let (events_tx, events_rx) = channel::unbounded();
    let provider = LocalProvider::new(config.trash_dir.clone(), events_tx);
    let store = match &config.settings_path {
        Some(path) => SettingsStore::with_path(path.clone()),
        None => SettingsStore::new(),
    };

    let mut session =
        DirectorySession::new(provider, PolicyDialog::new(), store, config.session);
    open_start_dir(&mut session, &config.start_dir);

    let (actor, worker) = actor::spawn(session, events_rx)?;
    rpc::run_rpc_server(&config.socket_path, actor)?;

    // Dropping the last handle lets the actor drain and exit.
    if worker.join().is_err() {
        warn!("Session actor panicked");
    }
    Ok(())
}

fn open_start_dir(session: &mut DirectorySession<LocalProvider, PolicyDialog>, dir: &Path) {
    let dir = dir.to_string_lossy();
    if session.open(&dir, Navigation::Direct).is_none() {
        warn!("Start directory {dir} is not available");
    }
    for message in session.dialog().take_messages() {
        warn!("{message}");
    }
}
