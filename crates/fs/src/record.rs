use std::{
    fs, io,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

/// Raw attributes of one filesystem node as reported by a provider.
///
/// Timestamps are epoch milliseconds; `0` means unavailable. For symbolic
/// links the type flags and times describe the link target when it resolves,
/// and `link_path` holds the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAttribute {
    pub is_device: bool,
    pub is_directory: bool,
    pub is_file: bool,
    pub is_hidden: bool,
    pub is_read_only: bool,
    pub is_symbolic_link: bool,
    pub is_system: bool,
    pub atime_ms: i64,
    pub ctime_ms: i64,
    pub mtime_ms: i64,
    pub birthtime_ms: i64,
    pub size: u64,
    pub link_path: String,
}

/// One directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dirent {
    pub name: String,
    pub parent_path: String,
    pub full_path: String,
    pub mime_type: String,
    pub attributes: FileAttribute,
}

/// One entry of the recycle bin.
///
/// `full_path` is where the provider keeps the item while trashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecycleBinItem {
    pub name: String,
    pub full_path: String,
    pub original_path: String,
    pub deleted_date_ms: i64,
    pub mime_type: String,
    pub attributes: FileAttribute,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volume {
    pub mount_point: String,
    pub volume_label: String,
    pub available_units: u64,
    pub total_units: u64,
}

impl FileAttribute {
    /// Read attributes without following a final dangling link.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let link_meta = fs::symlink_metadata(path)?;
        let is_symbolic_link = link_meta.file_type().is_symlink();

        let (meta, link_path) = if is_symbolic_link {
            let target = fs::read_link(path)
                .map(|t| match path.parent() {
                    Some(parent) if t.is_relative() => parent.join(t),
                    _ => t,
                })
                .map(|t| t.to_string_lossy().into_owned())
                .unwrap_or_default();
            (fs::metadata(path).unwrap_or_else(|_| link_meta.clone()), target)
        } else {
            (link_meta, String::new())
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (is_device, is_special) = special_kind(&meta);
        let is_directory = meta.is_dir();

        Ok(FileAttribute {
            is_device,
            is_directory,
            is_file: meta.is_file(),
            is_hidden: is_hidden(&name, &meta),
            is_read_only: meta.permissions().readonly(),
            is_symbolic_link,
            is_system: is_special || is_system(&meta),
            atime_ms: to_unix_ms(meta.accessed().ok()),
            ctime_ms: change_time_ms(&meta),
            mtime_ms: to_unix_ms(meta.modified().ok()),
            birthtime_ms: to_unix_ms(meta.created().ok()),
            size: if is_directory { 0 } else { meta.len() },
            link_path,
        })
    }
}

pub(crate) fn to_unix_ms(t: Option<SystemTime>) -> i64 {
    t.and_then(|tt| tt.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// `(is_device, is_special)`: block/char devices vs fifos and sockets.
#[cfg(unix)]
fn special_kind(meta: &fs::Metadata) -> (bool, bool) {
    use std::os::unix::fs::FileTypeExt;

    let ft = meta.file_type();
    (
        ft.is_block_device() || ft.is_char_device(),
        ft.is_fifo() || ft.is_socket(),
    )
}

#[cfg(not(unix))]
fn special_kind(_meta: &fs::Metadata) -> (bool, bool) {
    (false, false)
}

#[cfg(unix)]
fn change_time_ms(meta: &fs::Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;

    meta.ctime() * 1000 + meta.ctime_nsec() / 1_000_000
}

#[cfg(not(unix))]
fn change_time_ms(meta: &fs::Metadata) -> i64 {
    to_unix_ms(meta.modified().ok())
}

#[cfg(windows)]
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
#[cfg(windows)]
const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

#[cfg(windows)]
fn is_hidden(_name: &str, meta: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _meta: &fs::Metadata) -> bool {
    name.starts_with('.')
}

#[cfg(windows)]
fn is_system(meta: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    meta.file_attributes() & FILE_ATTRIBUTE_SYSTEM != 0
}

#[cfg(not(windows))]
fn is_system(_meta: &fs::Metadata) -> bool {
    false
}
