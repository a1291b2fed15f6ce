mod config;
pub mod logging;
pub mod settings;

pub use config::{
    ARCHIVE_EXT, HOME, POSIX_USER_ROOT_DIR, PROGRAM_NAME, RECYCLE_BIN, REGULAR_TYPES,
    SEARCH_CACHE_CAP, SHORTCUT_EXT, SORT_HISTORY_CAP, WIN_USER_ROOT_DIR, default_labels,
    default_settings_path, default_socket_path, default_start_dir, default_trash_dir,
    explite_dir, is_sentinel, recycle_bin_labels,
};

pub use logging::init;
pub use settings::{HeaderSetting, Settings, SettingsStore, SortHistory, now_ms};
