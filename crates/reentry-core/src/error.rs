//! Error types for reentry-core

/// Result type for reentry-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reentry-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration shape problem detected at load time
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// No branch entry matched and no default entry exists
    #[error("No branch configuration matches '{branch}' and no default entry exists")]
    BranchConfigMissing { branch: String },

    /// A sync target failed
    #[error("Sync failed for {target}: {message}")]
    SyncFailed { target: String, message: String },

    /// GitHub transport reported a non-2xx response
    #[error("GitHub API error ({status}): {body}")]
    GithubApi { status: u16, body: String },

    /// The Obsidian bridge is not available
    #[error("Obsidian bridge unavailable: {message}")]
    ObsidianUnavailable { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from reentry-fs
    #[error(transparent)]
    Fs(#[from] reentry_fs::Error),

    /// Render/parse error from reentry-status
    #[error(transparent)]
    Status(#[from] reentry_status::Error),

    /// Git error from reentry-git
    #[error(transparent)]
    Git(#[from] reentry_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Semantic version parse error
    #[error(transparent)]
    Version(#[from] semver::Error),

    /// Regex compilation error
    #[error(transparent)]
    Regex(#[from] regex::Error),
}
