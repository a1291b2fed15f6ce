use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use explite_engine::SessionOptions;
use explite_runtime::{default_socket_path, default_start_dir, default_trash_dir};

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Directory opened at startup
    pub start_dir: PathBuf,
    // Unix domain socket path
    pub socket_path: PathBuf,
    /// `None` uses the default store, which honours `EXPLITE_SETTINGS`
    pub settings_path: Option<PathBuf>,
    /// Base of the freedesktop-style recycle bin
    pub trash_dir: PathBuf,
    /// Append logs here instead of stderr
    pub log_file: Option<PathBuf>,
    pub session: SessionOptions,
}

#[derive(Debug, Parser)]
#[command(name = "explite-daemon", about = "Explite Daemon")]
pub struct Cli {
    /// Path to Unix domain socket (optional override)
    #[arg(long)]
    pub socket_path: Option<PathBuf>,

    /// Path to the settings file (optional override)
    #[arg(long)]
    pub settings_path: Option<PathBuf>,

    /// Directory to open at startup (defaults to the home directory)
    #[arg(long)]
    pub start_dir: Option<PathBuf>,

    /// Recycle bin location (optional override)
    #[arg(long)]
    pub trash_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Re-read the current directory after every mutation instead of
    /// waiting for watch events.
    #[arg(long)]
    pub reconcile_after_mutation: bool,

    /// Forget undone operations once a new operation is recorded.
    #[arg(long)]
    pub clear_redo_on_push: bool,
}

impl DaemonConfig {
    pub fn from_args(args: &Cli) -> Result<Self> {
        let start_dir = args.start_dir.clone().unwrap_or_else(default_start_dir);
        let socket_path = args.socket_path.clone().unwrap_or_else(default_socket_path);
        let trash_dir = args.trash_dir.clone().unwrap_or_else(default_trash_dir);

        Ok(Self {
            start_dir,
            socket_path,
            settings_path: args.settings_path.clone(),
            trash_dir,
            log_file: args.log_file.clone(),
            session: SessionOptions {
                reconcile_after_mutation: args.reconcile_after_mutation,
                clear_redo_on_push: args.clear_redo_on_push,
            },
        })
    }

    pub fn from_env() -> Result<Self> {
        let args = Cli::parse();
        Self::from_args(&args)
    }
}
