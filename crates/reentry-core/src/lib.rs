//! Core orchestration layer for the re-entry status manager
//!
//! Coordinates the leaf crates into the full system:
//!
//! - **Config resolution**: two-step config-source lookup, per-project
//!   overrides, defaults, and validation
//! - **File manager**: atomic dual-file persistence of the JSON +
//!   Markdown status pair and the roadmap document
//! - **Branch-aware versioning**: branch-pattern policy selection,
//!   version formatting, and bumping
//! - **Sync adapters**: GitHub and Obsidian publication with
//!   hash-based dirty detection over injected transport clients
//! - **ReentryManager**: the top-level orchestrator driving `sync_all`
//!   with fail-hard/fail-soft semantics
//!
//! # Architecture
//!
//! ```text
//!              CLI / version-bump hooks
//!                        |
//!                  reentry-core
//!                        |
//!        +---------+-----+------+
//!        |         |            |
//!   reentry-fs reentry-status reentry-git
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod manager;
pub mod sync;
pub mod version;

pub use config::{
    AuthConfig, FilesConfig, GithubConfig, HooksConfig, IssueConfig, ObsidianConfig,
    ReentryConfig, TemplateConfig, Validation, canonical_project_key, load_config,
    resolve_section, sync_targets, validate_config,
};
pub use error::{Error, Result};
pub use files::{WriteOutcome, ensure_roadmap, read_status, write_status_files};
pub use manager::ReentryManager;
pub use sync::{
    SyncAction, SyncDetails, SyncError, SyncResult, SyncTarget, TargetSyncer, published_key,
};
pub use sync::github::{GithubClient, GithubSyncer};
pub use sync::obsidian::{ObsidianClient, ObsidianSyncer};
pub use version::{
    BranchConfig, BranchPolicy, BumpStrategy, ReleaseType, VersionFormat, format_tag,
};
