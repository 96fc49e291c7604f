use std::path::PathBuf;

use thiserror::Error;

/// Raised when picking from a pool that turned out to be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot pick from an empty sequence")]
pub struct EmptyInputError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state document could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no user data directory is available on this platform")]
    NoDataDir,
}

/// Outcome of a share attempt that did not reach the share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// The player dismissed the share sheet; not shown to the player.
    #[error("share cancelled")]
    Aborted,
    #[error("share failed: {0}")]
    Failed(String),
}
