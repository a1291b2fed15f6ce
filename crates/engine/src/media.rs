use std::sync::LazyLock;

use chrono::{Local, TimeZone};
use explite_fs::{
    Dirent, FileAttribute, FileSystemProvider, ProviderError, RecycleBinItem,
    path::{basename, dirname, extname},
};
use explite_protocol::{EntityType, FileType, MediaFile};
use explite_runtime::{ARCHIVE_EXT, POSIX_USER_ROOT_DIR, REGULAR_TYPES, SHORTCUT_EXT, WIN_USER_ROOT_DIR};
use regex::Regex;

const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const MIME_AUDIO: &str = "audio";
const MIME_VIDEO: &str = "video";
const MIME_IMAGE: &str = "image";
const MIME_APP: &str = "application";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    fn user_root(self) -> &'static str {
        match self {
            Platform::Windows => WIN_USER_ROOT_DIR,
            Platform::Posix => POSIX_USER_ROOT_DIR,
        }
    }
}

/// Display strings the materializer substitutes for real extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub folder: String,
    pub shortcut: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            folder: "FileFolder".to_string(),
            shortcut: "Shortcut".to_string(),
        }
    }
}

const SPECIAL_FOLDERS: [(FileType, &str); 6] = [
    (FileType::Desktop, "Desktop"),
    (FileType::Documents, "Documents"),
    (FileType::Downloads, "Downloads"),
    (FileType::Music, "Music"),
    (FileType::Pictures, "Pictures"),
    (FileType::Videos, "Videos"),
];

/// `C:\Users\<user>\<Folder>`, case-insensitive.
static WIN_SPECIAL_FOLDERS: LazyLock<Vec<(FileType, Regex)>> = LazyLock::new(|| {
    special_folder_patterns(|name| format!(r"(?i)^C:\\Users\\[^\\]+\\{name}$"))
});

/// `/home/<user>/<Folder>`.
static POSIX_SPECIAL_FOLDERS: LazyLock<Vec<(FileType, Regex)>> =
    LazyLock::new(|| special_folder_patterns(|name| format!(r"^/home/[^/]+/{name}$")));

fn special_folder_patterns(pattern: impl Fn(&str) -> String) -> Vec<(FileType, Regex)> {
    SPECIAL_FOLDERS
        .iter()
        .filter_map(|(ft, name)| Regex::new(&pattern(name)).ok().map(|re| (*ft, re)))
        .collect()
}

/// Turns provider records into [`MediaFile`]s.
#[derive(Debug, Clone)]
pub struct Materializer {
    labels: Labels,
    platform: Platform,
}

impl Default for Materializer {
    fn default() -> Self {
        Materializer::new(Labels::default(), Platform::current())
    }
}

impl Materializer {
    pub fn new(labels: Labels, platform: Platform) -> Self {
        Materializer { labels, platform }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Batch entry point: everything needed is already in the listing.
    pub fn from_dirent(&self, dirent: &Dirent) -> MediaFile {
        self.build(&dirent.full_path, &dirent.attributes, &dirent.mime_type)
    }

    /// Single-path entry point for watch events and search hits.
    ///
    /// Stats the path and, for non-directories, looks up the mime type of the
    /// entry itself or of its target when it is a link.
    pub fn from_path<P>(&self, provider: &P, full_path: &str) -> Result<MediaFile, ProviderError>
    where
        P: FileSystemProvider + ?Sized,
    {
        let attr = provider.stat(full_path)?;
        let mime = if attr.is_directory {
            String::new()
        } else if attr.is_symbolic_link && !attr.link_path.is_empty() {
            provider.mime_type(&attr.link_path)?
        } else {
            provider.mime_type(full_path)?
        };
        Ok(self.build(full_path, &attr, &mime))
    }

    pub fn from_recycle_item(&self, item: &RecycleBinItem) -> MediaFile {
        let mut file = self.build(&item.full_path, &item.attributes, &item.mime_type);
        file.name = display_name(&item.original_path);
        file.original_path = item.original_path.clone();
        file.ddate = item.deleted_date_ms;
        file.ddate_string = date_string(item.deleted_date_ms);
        file.mime_type = item.mime_type.clone();
        file
    }

    fn build(&self, full_path: &str, attr: &FileAttribute, mime: &str) -> MediaFile {
        let entity_type = entity_type(attr);
        let actual_extension = if attr.is_directory {
            String::new()
        } else {
            extname(full_path)
        };
        let extension = self.display_extension(attr, &actual_extension);
        let file_type = self.file_type(full_path, attr, mime, &actual_extension);
        let is_file = entity_type.is_file();
        let size = attr.size.div_ceil(1024);

        MediaFile {
            id: id_for(full_path),
            full_path: full_path.to_string(),
            dir: dirname(full_path),
            name: display_name(full_path),
            mdate: attr.mtime_ms,
            mdate_string: date_string(attr.mtime_ms),
            cdate: attr.birthtime_ms,
            cdate_string: date_string(attr.birthtime_ms),
            ddate: 0,
            ddate_string: String::new(),
            size,
            size_string: if is_file { size_string(size) } else { String::new() },
            extension,
            actual_extension,
            is_file,
            entity_type,
            file_type,
            link_path: attr.link_path.clone(),
            original_path: String::new(),
            mime_type: String::new(),
        }
    }

    fn display_extension(&self, attr: &FileAttribute, actual: &str) -> String {
        if attr.is_symbolic_link {
            self.labels.shortcut.clone()
        } else if attr.is_directory {
            self.labels.folder.clone()
        } else {
            actual.to_string()
        }
    }

    fn file_type(&self, full_path: &str, attr: &FileAttribute, mime: &str, ext: &str) -> FileType {
        if attr.is_directory && full_path.starts_with(self.platform.user_root()) {
            if let Some(special) = self.special_folder(full_path) {
                return special;
            }
        }

        if attr.is_directory {
            return if attr.is_hidden {
                FileType::HiddenFolder
            } else {
                FileType::Folder
            };
        }

        if REGULAR_TYPES.contains(&ext) {
            return FileType::Normal;
        }

        let mime = mime.to_lowercase();
        if mime.contains(MIME_AUDIO) {
            FileType::Audio
        } else if mime.contains(MIME_VIDEO) {
            FileType::Video
        } else if mime.contains(MIME_IMAGE) {
            FileType::Image
        } else if mime.contains(MIME_APP) {
            if ARCHIVE_EXT.contains(&ext) {
                FileType::Zip
            } else {
                FileType::App
            }
        } else {
            FileType::Normal
        }
    }

    fn special_folder(&self, full_path: &str) -> Option<FileType> {
        let patterns = match self.platform {
            Platform::Windows => &*WIN_SPECIAL_FOLDERS,
            Platform::Posix => &*POSIX_SPECIAL_FOLDERS,
        };
        patterns
            .iter()
            .find(|(_, re)| re.is_match(full_path))
            .map(|(ft, _)| *ft)
    }
}

fn entity_type(attr: &FileAttribute) -> EntityType {
    match (attr.is_symbolic_link, attr.is_directory) {
        (true, true) => EntityType::SymlinkFolder,
        (true, false) => EntityType::SymlinkFile,
        (false, true) => EntityType::Folder,
        (false, false) => EntityType::File,
    }
}

/// Stable identity for a path, safe to use as a front-end key.
pub fn id_for(full_path: &str) -> String {
    urlencoding::encode(full_path).into_owned()
}

/// Basename with a trailing shortcut suffix removed.
pub fn display_name(full_path: &str) -> String {
    let name = basename(full_path);
    if extname(&name) == SHORTCUT_EXT {
        name[..name.len() - SHORTCUT_EXT.len()].to_string()
    } else {
        name
    }
}

fn date_string(ms: i64) -> String {
    if ms == 0 {
        return String::new();
    }
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// `1234` -> `"1,234 KB"`.
fn size_string(kb: u64) -> String {
    let digits = kb.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(" KB");
    out
}

#[cfg(test)]
#[path = "media_tests.rs"]
mod tests;
