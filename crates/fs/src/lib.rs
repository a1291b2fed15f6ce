mod error;
mod helpers;
mod local;
mod memory;
pub mod mime;
pub mod path;
mod provider;
mod record;
mod trash;
mod walker;
mod watcher;

pub use error::{ProviderError, Result};
pub use local::LocalProvider;
pub use memory::{Call, MemoryProvider};
pub use provider::FileSystemProvider;
pub use record::{Dirent, FileAttribute, RecycleBinItem, Volume};
pub use trash::{TrashEntry, TrashStore};
pub use walker::{WalkContext, walk_parallel};
pub use watcher::{DirWatcher, RENAME_PAIR_WINDOW};
