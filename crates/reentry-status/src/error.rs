//! Error types for reentry-status

/// Result type for reentry-status operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or parsing status documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Regex compilation error
    #[error(transparent)]
    Regex(#[from] regex::Error),
}
