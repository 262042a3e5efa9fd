use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the edges of the crate.
///
/// The simulation itself never fails: illegal transitions are ignored and all
/// geometry is total. These variants only surface from storage, settings and
/// the command-line runner.
#[derive(Debug, Error)]
pub enum Error {
    /// The key-value store rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted document could not be encoded or decoded.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Propagated I/O errors from the file-backed store.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A game name that does not match any known game.
    #[error("unknown game: {0}")]
    UnknownGame(String),
}
