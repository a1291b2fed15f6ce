mod error;
mod filter;
mod history;
mod media;
mod session;
mod sort;

pub use error::{Result, SessionError};
pub use filter::{NameFilter, normalize};
pub use history::{FileOperation, HistoryOptions, OperationHistory};
pub use media::{Labels, Materializer, Platform, display_name, id_for};
pub use session::{Dialog, DirectorySession, PolicyDialog, SearchCache, SessionOptions};
pub use sort::{compare, locale_cmp, sort_files};
