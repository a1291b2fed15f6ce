use explite_fs::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("\"{0}\" does not exist")]
    NotFound(String),

    #[error("\"{0}\" already exists")]
    Collision(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The compensating (undo) or replayed (redo) call failed.
    #[error("{step} of {kind} failed: {source}")]
    Reversal {
        step: &'static str,
        kind: &'static str,
        #[source]
        source: ProviderError,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
