pub mod client;
pub mod request;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use explite_protocol::{DaemonResponse, SortKey};
use explite_runtime::default_socket_path;

use crate::printer::{ColorChoice, OutputFormat, PrinterConfig, make_printer};

/// Common error type for command handlers
pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "explite",
    version,
    about = "Explite - drive a file-explorer session from the shell",
    propagate_version = true
)]
pub struct Cli {
    /// Path to the daemon's Unix socket (optional override)
    #[arg(long, global = true)]
    pub socket_path: Option<PathBuf>,

    /// Output formatting options
    #[command(flatten)]
    pub output: OutputOptions,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output results as NDJSON (one JSON object per line)
    #[arg(long, global = true)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto", global = true)]
    pub color: String,
}

impl OutputOptions {
    pub fn config(&self) -> PrinterConfig {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        let color = match self.color.as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        };

        PrinterConfig { format, color }
    }
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Items to transfer
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Destination directory
    pub dir: PathBuf,

    /// Replace items of the same name at the destination
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Subcommand, Debug)]
pub enum FavAction {
    /// Remember a directory.
    Add { path: PathBuf },
    /// Forget a directory.
    Remove { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a directory, or re-read the current one.
    ///
    /// Example:
    ///   explite ls ~/Pictures
    Ls { path: Option<PathBuf> },

    /// Re-read the current directory.
    Reload,

    /// Sort the current directory and remember the choice.
    ///
    /// Example:
    ///   explite sort size --desc
    Sort {
        key: SortKey,
        #[arg(long)]
        desc: bool,
    },

    /// Filter everything under a directory by name.
    ///
    /// Example:
    ///   explite search vacation --dir ~/Pictures
    Search {
        key: String,
        /// Search root (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Leave search results and show the directory again.
    EndSearch,

    /// Create a directory.
    Mkdir { path: PathBuf },

    /// Create an empty file.
    Touch { path: PathBuf },

    /// Rename an item within its directory.
    Rename { path: PathBuf, new_name: String },

    /// Move items to the recycle bin.
    Trash {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Delete items permanently.
    Rm {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Restore recycle-bin items given as ORIGINAL_PATH@DELETED_MS, or
    /// everything when none are given.
    Restore { items: Vec<String> },

    /// Remove recycle-bin items (ORIGINAL_PATH@DELETED_MS) for good.
    Purge {
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Move items into a directory.
    Mv(TransferArgs),

    /// Copy items into a directory.
    Cp(TransferArgs),

    /// Move within a volume, copy across volumes.
    Drop(TransferArgs),

    /// Reverse the last operation.
    Undo,

    /// Replay the last undone operation.
    Redo,

    /// Show the recycle bin.
    Bin,

    /// Empty the recycle bin.
    EmptyBin,

    /// List mounted volumes.
    Volumes,

    /// List, add or remove favorite directories.
    Fav {
        #[command(subcommand)]
        action: Option<FavAction>,
    },

    /// Show the daemon's session state.
    Status,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[error] {e}");
            ExitCode::from(2)
        }
    }
}

fn execute(cli: Cli) -> CommandResult<ExitCode> {
    let socket_path = cli.socket_path.clone().unwrap_or_else(default_socket_path);
    let request = request::build(cli.command)?;

    let reply = client::send(&socket_path, &request)?;

    let mut printer = make_printer(cli.output.config());
    printer.print_reply(&reply)?;

    Ok(if succeeded(&reply.response) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn succeeded(response: &DaemonResponse) -> bool {
    match response {
        DaemonResponse::Done(done) => *done,
        DaemonResponse::Loaded(ev) => !ev.failed,
        DaemonResponse::Created(r) => r.success,
        DaemonResponse::Renamed(r) => r.done,
        DaemonResponse::Moved(r) => r.done,
        DaemonResponse::Error(_) => false,
        _ => true,
    }
}
