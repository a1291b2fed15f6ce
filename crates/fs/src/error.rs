use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("\"{0}\" does not exist")]
    NotFound(String),

    #[error("\"{0}\" already exists")]
    AlreadyExists(String),

    #[error("{0} is not supported by this provider")]
    Unsupported(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("watch failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Raised by `MemoryProvider` when a failure was injected for `op`.
    #[error("{op} failed on \"{path}\"")]
    Failed { op: &'static str, path: String },
}

impl From<io::Error> for ProviderError {
    fn from(source: io::Error) -> Self {
        ProviderError::Io {
            path: String::new(),
            source,
        }
    }
}

impl ProviderError {
    /// Map an I/O error on `path`, keeping not-found and already-exists distinct.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => ProviderError::NotFound(path),
            io::ErrorKind::AlreadyExists => ProviderError::AlreadyExists(path),
            _ => ProviderError::Io { path, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}
