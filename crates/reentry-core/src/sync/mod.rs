//! Sync targets, results, and the adapter seam
//!
//! Every sync attempt (success, skip, or failure) produces a
//! [`SyncResult`]; the orchestrator never hides a target's outcome even
//! when it continues past it. Adapters implement [`TargetSyncer`] and
//! never mutate the status record themselves: ids and hashes travel
//! back in [`SyncDetails`] for the orchestrator to fold in.

pub mod github;
pub mod obsidian;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use reentry_status::Status;

/// A destination `sync_all` can publish to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTarget {
    Files,
    Github,
    Obsidian,
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files => write!(f, "files"),
            Self::Github => write!(f, "github"),
            Self::Obsidian => write!(f, "obsidian"),
        }
    }
}

/// Key of a target's entry in `syncMetadata.published`.
pub fn published_key(target: SyncTarget) -> &'static str {
    match target {
        SyncTarget::Files => "filesHash",
        SyncTarget::Github => "githubHash",
        SyncTarget::Obsidian => "obsidianHash",
    }
}

/// What a successful sync did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Skipped,
    Created,
    Updated,
}

/// Target-specific outcome payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDetails {
    pub action: SyncAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Content hash of the published body; folded into
    /// `syncMetadata.published` by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_path: Option<String>,
}

impl SyncDetails {
    pub fn new(action: SyncAction) -> Self {
        Self {
            action,
            reason: None,
            hash: None,
            issue_number: None,
            issue_url: None,
            note_path: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(SyncAction::Skipped)
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_issue(mut self, number: u64, url: impl Into<String>) -> Self {
        self.issue_number = Some(number);
        self.issue_url = Some(url.into());
        self
    }

    pub fn with_note(mut self, path: impl Into<String>) -> Self {
        self.note_path = Some(path.into());
        self
    }
}

/// Structured failure carried on a [`SyncResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub message: String,
    /// Whether the orchestrator may continue past this failure under
    /// fail-soft policy.
    pub recoverable: bool,
}

/// Outcome of one sync attempt against one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub target: SyncTarget,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SyncDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SyncError>,
}

impl SyncResult {
    pub fn succeeded(target: SyncTarget, details: SyncDetails, duration: Duration) -> Self {
        Self {
            target,
            success: true,
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            details: Some(details),
            error: None,
        }
    }

    pub fn failed(
        target: SyncTarget,
        message: impl Into<String>,
        recoverable: bool,
        duration: Duration,
    ) -> Self {
        Self {
            target,
            success: false,
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            details: None,
            error: Some(SyncError {
                message: message.into(),
                recoverable,
            }),
        }
    }
}

/// Adapter seam for remote sync targets.
///
/// Implementations render their target-specific body from the status
/// record and the already-rendered Markdown, decide whether anything
/// changed, and only then talk to their transport client.
pub trait TargetSyncer {
    fn target(&self) -> SyncTarget;

    /// Publish the status to the target, skipping when unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport fails; policy (fail-hard vs
    /// fail-soft) is the orchestrator's concern.
    fn sync(&self, status: &Status, markdown: &str) -> Result<SyncResult>;
}
