//! GitHub sync adapter
//!
//! Maintains one tracking issue, found by exact title among open
//! issues. Checks run cheapest-first: the last-published hash, then the
//! live issue body, and only then a create/update call through the
//! injected transport client.

use std::time::Instant;

use crate::Result;
use crate::config::GithubConfig;
use crate::sync::{SyncAction, SyncDetails, SyncResult, SyncTarget, TargetSyncer, published_key};
use reentry_fs::{content_hash, text_eq};
use reentry_status::Status;

/// A reference to an existing or just-written issue.
#[derive(Debug, Clone)]
pub struct IssueRef {
    pub number: u64,
    pub url: String,
    pub body: String,
}

/// Lookup parameters for the tracking issue.
#[derive(Debug, Clone)]
pub struct IssueQuery<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub title: &'a str,
}

/// Request to open a new tracking issue.
#[derive(Debug, Clone)]
pub struct CreateIssue<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub labels: &'a [String],
    pub assignees: &'a [String],
}

/// Request to replace an existing issue's body.
#[derive(Debug, Clone)]
pub struct UpdateIssue<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub number: u64,
    pub body: &'a str,
}

/// Transport seam to the GitHub API.
///
/// Implementations must surface non-2xx responses as
/// [`crate::Error::GithubApi`] carrying the HTTP status and body text.
pub trait GithubClient {
    /// Find an open issue by exact title.
    fn find_issue_by_title(&self, query: &IssueQuery<'_>) -> Result<Option<IssueRef>>;

    fn create_issue(&self, request: &CreateIssue<'_>) -> Result<IssueRef>;

    fn update_issue(&self, request: &UpdateIssue<'_>) -> Result<IssueRef>;
}

/// Sync adapter publishing the status summary to a GitHub issue.
pub struct GithubSyncer {
    config: GithubConfig,
    client: Box<dyn GithubClient>,
}

impl GithubSyncer {
    pub fn new(config: GithubConfig, client: Box<dyn GithubClient>) -> Self {
        Self { config, client }
    }

    /// The issue body: a fixed heading plus the Markdown summary.
    pub fn render_body(markdown: &str) -> String {
        format!("# Re-entry Status\n\n{markdown}")
    }
}

impl TargetSyncer for GithubSyncer {
    fn target(&self) -> SyncTarget {
        SyncTarget::Github
    }

    fn sync(&self, status: &Status, markdown: &str) -> Result<SyncResult> {
        let started = Instant::now();
        let body = Self::render_body(markdown);
        let hash = content_hash(&body);

        let key = published_key(SyncTarget::Github);
        if status.sync_metadata.published.get(key) == Some(&hash) {
            tracing::debug!("github issue unchanged (hash), skipping");
            return Ok(SyncResult::succeeded(
                SyncTarget::Github,
                SyncDetails::skipped("unchanged (hash)"),
                started.elapsed(),
            ));
        }

        let query = IssueQuery {
            owner: &self.config.owner,
            repo: &self.config.repo,
            title: &self.config.issue.title,
        };

        match self.client.find_issue_by_title(&query)? {
            Some(issue) if text_eq(&issue.body, &body) => {
                tracing::debug!(issue = issue.number, "github issue unchanged (body), skipping");
                Ok(SyncResult::succeeded(
                    SyncTarget::Github,
                    SyncDetails::skipped("unchanged (body)").with_issue(issue.number, issue.url),
                    started.elapsed(),
                ))
            }
            Some(issue) => {
                let updated = self.client.update_issue(&UpdateIssue {
                    owner: &self.config.owner,
                    repo: &self.config.repo,
                    number: issue.number,
                    body: &body,
                })?;
                tracing::info!(issue = updated.number, "updated github issue");
                Ok(SyncResult::succeeded(
                    SyncTarget::Github,
                    SyncDetails::new(SyncAction::Updated)
                        .with_hash(hash)
                        .with_issue(updated.number, updated.url),
                    started.elapsed(),
                ))
            }
            None => {
                let created = self.client.create_issue(&CreateIssue {
                    owner: &self.config.owner,
                    repo: &self.config.repo,
                    title: &self.config.issue.title,
                    body: &body,
                    labels: &self.config.issue.labels,
                    assignees: &self.config.issue.assignees,
                })?;
                tracing::info!(issue = created.number, "created github issue");
                Ok(SyncResult::succeeded(
                    SyncTarget::Github,
                    SyncDetails::new(SyncAction::Created)
                        .with_hash(hash)
                        .with_issue(created.number, created.url),
                    started.elapsed(),
                ))
            }
        }
    }
}
