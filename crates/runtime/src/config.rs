use std::path::PathBuf;

use explite_protocol::{ColumnLabel, SortKey};

pub const PROGRAM_NAME: &str = "explite";
pub const PROGRAM_LOG_LEVEL: &str = "EXPLITE_LOG_LEVEL";
pub const SETTINGS_FILE_NAME: &str = "explite.settings.json";
pub const SOCKET_FILE_NAME: &str = "daemon.sock";

/// Pseudo-directory for the drive overview. Never listed, never watched.
pub const HOME: &str = "PC";
/// Pseudo-directory backed by the provider's recycle bin. Never watched.
pub const RECYCLE_BIN: &str = "RecycleBin";

/// Directories remembered in the per-directory sort/column history.
pub const SORT_HISTORY_CAP: usize = 100;
/// Recursive listings kept for repeated searches.
pub const SEARCH_CACHE_CAP: usize = 8;

/// Extensions that always classify as plain text/code, whatever their mime.
pub const REGULAR_TYPES: &[&str] = &[".ts", ".json", ".mjs", ".cjs"];
pub const ARCHIVE_EXT: &[&str] = &[".zip", ".tar", ".7z", ".gz", ".bz", ".xz"];
pub const SHORTCUT_EXT: &str = ".lnk";

pub const WIN_USER_ROOT_DIR: &str = "C:\\Users";
pub const POSIX_USER_ROOT_DIR: &str = "/home/";

pub fn is_sentinel(dir: &str) -> bool {
    dir == HOME || dir == RECYCLE_BIN
}

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(xdg_var) {
        PathBuf::from(dir)
    } else {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(home_suffix)
    }
}

/// Directory the daemon starts in when none is given.
pub fn default_start_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

pub fn explite_dir() -> PathBuf {
    xdg_or_home("XDG_CACHE_HOME", ".cache").join(PROGRAM_NAME)
}

pub fn default_socket_path() -> PathBuf {
    explite_dir().join(SOCKET_FILE_NAME)
}

pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| xdg_or_home("XDG_CONFIG_HOME", ".config"))
        .join(PROGRAM_NAME)
        .join(SETTINGS_FILE_NAME)
}

/// Base of the local provider's recycle bin (freedesktop layout).
pub fn default_trash_dir() -> PathBuf {
    xdg_or_home("XDG_DATA_HOME", ".local/share").join("Trash")
}

fn label(label: &str, width: u32, sort_key: SortKey) -> ColumnLabel {
    ColumnLabel {
        label: label.to_string(),
        width,
        sort_key,
    }
}

/// Headers for an ordinary directory listing.
pub fn default_labels() -> Vec<ColumnLabel> {
    vec![
        label("Name", 500, SortKey::Name),
        label("Folder", 400, SortKey::Directory),
        label("Type", 200, SortKey::Extension),
        label("Modified Date", 200, SortKey::Mdate),
        label("Created Date", 200, SortKey::Cdate),
        label("Size", 400, SortKey::Size),
    ]
}

/// Headers for the recycle-bin listing.
pub fn recycle_bin_labels() -> Vec<ColumnLabel> {
    vec![
        label("Name", 500, SortKey::Name),
        label("Original Location", 400, SortKey::OrigPath),
        label("Deleted Date", 200, SortKey::Ddate),
        label("Type", 200, SortKey::Extension),
        label("Size", 400, SortKey::Size),
    ]
}
