pub mod codec;

use serde::{Deserialize, Serialize};

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Extension,
    Cdate,
    Mdate,
    Size,
    Directory,
    Ddate,
    OrigPath,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Name,
        SortKey::Directory,
        SortKey::Extension,
        SortKey::Mdate,
        SortKey::Cdate,
        SortKey::Size,
        SortKey::Ddate,
        SortKey::OrigPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Extension => "extension",
            SortKey::Cdate => "cdate",
            SortKey::Mdate => "mdate",
            SortKey::Size => "size",
            SortKey::Directory => "directory",
            SortKey::Ddate => "ddate",
            SortKey::OrigPath => "orig_path",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortType {
    pub asc: bool,
    pub key: SortKey,
}

impl Default for SortType {
    fn default() -> Self {
        Self {
            asc: true,
            key: SortKey::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLabel {
    pub label: String,
    pub width: u32,
    pub sort_key: SortKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    File,
    Folder,
    SymlinkFile,
    SymlinkFolder,
}

impl EntityType {
    /// Files and shortcuts (whatever they point at) group together.
    pub fn is_file(self) -> bool {
        matches!(self, EntityType::File | EntityType::SymlinkFile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Video,
    Audio,
    Image,
    App,
    Normal,
    Folder,
    HiddenFolder,
    Zip,
    Desktop,
    Documents,
    Downloads,
    Music,
    Pictures,
    Videos,
}

/// One directory entry as presented to a front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Derived from `full_path`; a rename produces a new id.
    pub id: String,
    pub full_path: String,
    pub dir: String,
    pub name: String,
    pub mdate: i64,
    pub mdate_string: String,
    pub cdate: i64,
    pub cdate_string: String,
    pub ddate: i64,
    pub ddate_string: String,
    /// Kilobytes, rounded up.
    pub size: u64,
    pub size_string: String,
    /// Real extension, or the folder/shortcut label.
    pub extension: String,
    pub actual_extension: String,
    pub is_file: bool,
    pub entity_type: EntityType,
    pub file_type: FileType,
    /// Symlink target; empty for regular entries.
    pub link_path: String,
    /// Recycle-bin items only.
    pub original_path: String,
    /// Recycle-bin items only.
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Navigation {
    #[default]
    Direct,
    Back,
    Forward,
    Reload,
    PathSelect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadEvent {
    pub files: Vec<MediaFile>,
    pub directory: String,
    pub navigation: Navigation,
    pub sort_type: SortType,
    pub failed: bool,
    pub headers: Vec<ColumnLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortResult {
    pub files: Vec<MediaFile>,
    pub sort_type: SortType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub files: Vec<MediaFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub full_paths: Vec<String>,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResult {
    pub new_item_id: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameResult {
    pub done: bool,
    pub new_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveInfo {
    pub label: String,
    pub name: String,
    pub path: String,
    pub available: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchKind {
    Create,
    Remove,
    Rename,
}

/// Change notification from a directory watcher.
///
/// Create and Remove batch any number of `to_paths`; Rename always carries
/// exactly one `from_paths` entry and one `to_paths` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    pub operation: WatchKind,
    pub to_paths: Vec<String>,
    pub from_paths: Vec<String>,
}

impl WatchEvent {
    pub fn create(paths: Vec<String>) -> Self {
        Self {
            operation: WatchKind::Create,
            to_paths: paths,
            from_paths: Vec::new(),
        }
    }

    pub fn remove(paths: Vec<String>) -> Self {
        Self {
            operation: WatchKind::Remove,
            to_paths: paths,
            from_paths: Vec::new(),
        }
    }

    pub fn rename(from: String, to: String) -> Self {
        Self {
            operation: WatchKind::Rename,
            to_paths: vec![to],
            from_paths: vec![from],
        }
    }
}

/// Identifies one recycle-bin entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndeleteItem {
    pub original_path: String,
    pub deleted_time_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub current_dir: String,
    pub watch_target: String,
    pub file_count: usize,
    pub searching: bool,
    pub search_key: String,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum DaemonRequest {
    Ping,
    Status,
    Open {
        path: String,
        navigation: Navigation,
    },
    Reload,
    Sort(SortType),
    Search {
        /// Empty searches the current directory.
        dir: String,
        key: String,
    },
    EndSearch,
    CreateItem {
        dir: String,
        name: String,
        is_file: bool,
    },
    Rename {
        path: String,
        new_name: String,
    },
    Trash(Vec<String>),
    Delete(Vec<String>),
    /// Restore specific recycle-bin entries, or everything listed when empty.
    Undelete(Vec<UndeleteItem>),
    DeleteFromRecycleBin(Vec<UndeleteItem>),
    EmptyRecycleBin,
    MoveItems {
        paths: Vec<String>,
        dir: String,
        /// `None` lets the session decide by comparing volumes.
        copy: Option<bool>,
        overwrite: bool,
    },
    Undo,
    Redo,
    ListVolumes,
    ChangeColumns(Vec<ColumnLabel>),
    AddFavorite(String),
    RemoveFavorite(String),
    ListFavorites,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum DaemonResponse {
    Pong,
    Status(SessionStatus),
    Loaded(LoadEvent),
    Sorted(SortResult),
    Searched(SearchResult),
    Created(CreateResult),
    Renamed(RenameResult),
    Moved(MoveResult),
    /// Outcome of a mutation or history step that has no richer result.
    Done(bool),
    Volumes(Vec<DriveInfo>),
    Favorites(Vec<String>),
    Error(String),
}

/// A response plus every user-facing message raised while producing it.
#[derive(Debug, Serialize, Deserialize)]
pub struct DaemonReply {
    pub response: DaemonResponse,
    pub messages: Vec<String>,
}
