//! Error types for reentry-git

use std::path::PathBuf;

/// Result type for reentry-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reentry-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error(transparent)]
    Git(#[from] git2::Error),
}
