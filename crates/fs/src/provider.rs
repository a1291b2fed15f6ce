use explite_protocol::UndeleteItem;

use crate::{
    error::Result,
    record::{Dirent, FileAttribute, RecycleBinItem, Volume},
};

/// Host filesystem operations the session is built on.
///
/// Every call is synchronous and may fail with a [`crate::ProviderError`].
/// Watch notifications are not returned from here; implementations deliver
/// them on the channel they were constructed with.
pub trait FileSystemProvider {
    /// Direct children of `dir`, or every descendant when `recursive`.
    fn readdir(&self, dir: &str, recursive: bool) -> Result<Vec<Dirent>>;
    fn stat(&self, path: &str) -> Result<FileAttribute>;
    /// Empty for directories.
    fn mime_type(&self, path: &str) -> Result<String>;
    fn exists(&self, path: &str) -> bool;

    fn rename(&self, old_path: &str, new_path: &str) -> Result<()>;
    fn mkdir(&self, path: &str) -> Result<()>;
    fn mkdir_all(&self, path: &str) -> Result<()>;
    /// Create an empty file.
    fn create(&self, path: &str) -> Result<()>;

    /// Copy each of `from` into directory `to`, keeping basenames.
    fn copy(&self, from: &[String], to: &str) -> Result<()>;
    /// Move each of `from` into directory `to`, keeping basenames.
    fn move_items(&self, from: &[String], to: &str) -> Result<()>;

    fn trash(&self, paths: &[String]) -> Result<()>;
    /// Permanent removal.
    fn delete(&self, paths: &[String]) -> Result<()>;
    /// Restore the most recently trashed item for each original path.
    fn undelete(&self, original_paths: &[String]) -> Result<()>;
    /// Restore items identified by original path and deletion time.
    fn undelete_by_time(&self, items: &[UndeleteItem]) -> Result<()>;
    fn delete_from_recycle_bin(&self, items: &[UndeleteItem]) -> Result<()>;
    fn read_recycle_bin(&self) -> Result<Vec<RecycleBinItem>>;
    fn empty_recycle_bin(&self) -> Result<()>;

    /// Start watching `path`, replacing any previous watch.
    fn watch(&self, path: &str, recursive: bool) -> Result<()>;
    /// Stop watching `path`; a no-op when it is not the active target.
    fn unwatch(&self, path: &str) -> Result<()>;

    fn list_volumes(&self) -> Result<Vec<Volume>>;
}
