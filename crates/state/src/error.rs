use std::path::PathBuf;

/// All errors that can be returned by a WorldState implementation.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The backing store could not be reached or written (I/O, lock poisoning).
    #[error("world state unavailable: {0}")]
    Unavailable(String),

    /// Persisted state exists but cannot be loaded.
    #[error("world state at {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// A range iterator was advanced after it had been released.
    #[error("range iterator used after close")]
    IteratorClosed,

    /// A backend-specific storage error.
    #[error("world state backend error: {0}")]
    Backend(String),
}
