//! Top-level status orchestrator
//!
//! Owns the status record: loading, the single mutation entry point,
//! and `sync_all` across the files/GitHub/Obsidian targets. Local
//! persistence failures always propagate; remote failures are recorded
//! and either re-thrown (fail-hard) or logged and bypassed (fail-soft).

use std::time::Instant;

use chrono::Utc;

use crate::config::{self, ReentryConfig};
use crate::files;
use crate::sync::{
    SyncAction, SyncDetails, SyncResult, SyncTarget, TargetSyncer, published_key,
};
use crate::{Error, Result};
use reentry_status::{Status, Trigger, UpdateContext, render_markdown};

/// Orchestrator for one project scope.
///
/// Remote syncers are dependency-injected so transports stay out of the
/// core; a manager without syncers still fully handles the `files`
/// target.
pub struct ReentryManager {
    config: ReentryConfig,
    github: Option<Box<dyn TargetSyncer>>,
    obsidian: Option<Box<dyn TargetSyncer>>,
}

impl ReentryManager {
    pub fn new(config: ReentryConfig) -> Self {
        Self {
            config,
            github: None,
            obsidian: None,
        }
    }

    pub fn with_github(mut self, syncer: Box<dyn TargetSyncer>) -> Self {
        self.github = Some(syncer);
        self
    }

    pub fn with_obsidian(mut self, syncer: Box<dyn TargetSyncer>) -> Self {
        self.obsidian = Some(syncer);
        self
    }

    pub fn config(&self) -> &ReentryConfig {
        &self.config
    }

    /// Load the persisted status, initializing the pair on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or the initial write fails.
    pub fn load_or_init(&self) -> Result<Status> {
        match files::read_status(&self.config)? {
            Some(status) => Ok(status),
            None => {
                let status = Status::initial(&self.config.files.roadmap_path);
                files::write_status_files(&self.config, &status)?;
                tracing::info!(path = %self.config.files.json_path, "initialized status pair");
                Ok(status)
            }
        }
    }

    /// Apply a mutation and persist the result.
    ///
    /// This is the only mutation entry point: every caller goes through
    /// load-or-init, the updater, and an atomic write.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or persisting fails.
    pub fn update_status(&self, updater: impl FnOnce(&mut Status)) -> Result<Status> {
        let mut status = self.load_or_init()?;
        updater(&mut status);
        files::write_status_files(&self.config, &status)?;
        Ok(status)
    }

    /// Stamp an update context and the last-updated timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or persisting fails.
    pub fn apply_context(&self, context: UpdateContext) -> Result<Status> {
        self.update_status(|status| {
            status.context = context;
            status.last_updated = Utc::now();
        })
    }

    /// Sync the status to the given targets, or to all configured ones.
    ///
    /// `files` always runs first and its failures always propagate,
    /// regardless of the fail-hard policy. Remote targets run strictly
    /// in sequence; after each changed remote the status is re-persisted
    /// immediately so the recorded hash survives a crash between
    /// targets (the next run then only re-syncs the later target).
    ///
    /// # Errors
    ///
    /// Local persistence failures, always. Remote failures only when
    /// `fail_hard` is set; otherwise they are captured in the returned
    /// results and the loop continues.
    pub fn sync_all(&self, targets: Option<&[SyncTarget]>) -> Result<Vec<SyncResult>> {
        let mut resolved: Vec<SyncTarget> = match targets {
            Some(explicit) => explicit.to_vec(),
            None => config::sync_targets(&self.config),
        };
        // local persistence always runs, and always first
        if !resolved.is_empty() {
            resolved.retain(|t| *t != SyncTarget::Files);
            resolved.insert(0, SyncTarget::Files);
        }

        let mut results = Vec::with_capacity(resolved.len());
        let mut status = self.load_or_init()?;

        for target in resolved {
            if target == SyncTarget::Files {
                results.push(self.sync_files(&status)?);
                continue;
            }

            let syncer = match target {
                SyncTarget::Github => self.github.as_deref(),
                SyncTarget::Obsidian => self.obsidian.as_deref(),
                SyncTarget::Files => None,
            };
            let Some(syncer) = syncer else {
                let message = format!("no syncer configured for target '{target}'");
                tracing::warn!(%target, "skipping remote target: no syncer injected");
                results.push(SyncResult::failed(
                    target,
                    message.clone(),
                    true,
                    Default::default(),
                ));
                if self.config.fail_hard {
                    return Err(Error::SyncFailed {
                        target: target.to_string(),
                        message,
                    });
                }
                continue;
            };

            status.sync_metadata.last_attempt = Some(Utc::now());
            let markdown = render_markdown(&status);
            let started = Instant::now();

            match syncer.sync(&status, &markdown) {
                Ok(result) => {
                    if let Some(details) = result.details.as_ref().filter(|d| {
                        matches!(d.action, SyncAction::Created | SyncAction::Updated)
                    }) {
                        record_publish(&mut status, target, details);
                        status.sync_metadata.last_success = Some(Utc::now());
                        // persisted mid-loop on purpose: a crash between
                        // targets keeps this target's hash durable
                        files::write_status_files(&self.config, &status)?;
                    }
                    results.push(result);
                }
                Err(error) => {
                    tracing::warn!(%target, %error, "sync target failed");
                    results.push(SyncResult::failed(
                        target,
                        error.to_string(),
                        true,
                        started.elapsed(),
                    ));
                    if self.config.fail_hard {
                        return Err(error);
                    }
                }
            }
        }

        Ok(results)
    }

    /// Run a version-lifecycle hook: stamp the trigger context and sync.
    ///
    /// A no-op unless the extension, auto-sync, and the matching hook
    /// toggle are all enabled.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::sync_all`].
    pub fn run_hook(&self, trigger: Trigger) -> Result<Vec<SyncResult>> {
        let hook_enabled = match trigger {
            Trigger::PostVersion => self.config.hooks.post_version,
            Trigger::PostRelease => self.config.hooks.post_release,
            Trigger::Manual | Trigger::Auto => true,
        };
        if !self.config.enabled || !self.config.auto_sync || !hook_enabled {
            tracing::debug!(?trigger, "hook sync disabled, skipping");
            return Ok(Vec::new());
        }

        self.apply_context(UpdateContext {
            trigger,
            ..UpdateContext::default()
        })?;
        self.sync_all(None)
    }

    fn sync_files(&self, status: &Status) -> Result<SyncResult> {
        let started = Instant::now();
        let outcome = files::write_status_files(&self.config, status)?;
        let roadmap_changed = files::ensure_roadmap(&self.config, status)?;

        let details = if outcome.changed || roadmap_changed {
            SyncDetails::new(SyncAction::Updated)
        } else {
            SyncDetails::skipped("unchanged")
        };
        Ok(SyncResult::succeeded(
            SyncTarget::Files,
            details,
            started.elapsed(),
        ))
    }
}

/// Fold a changed remote's ids and hash back into the sync metadata.
fn record_publish(status: &mut Status, target: SyncTarget, details: &SyncDetails) {
    if let Some(hash) = &details.hash {
        status
            .sync_metadata
            .published
            .insert(published_key(target).to_string(), hash.clone());
    }
    match target {
        SyncTarget::Github => {
            if let Some(number) = details.issue_number {
                status.sync_metadata.github_issue_id = Some(number);
            }
            if let Some(url) = &details.issue_url {
                status.sync_metadata.github_issue_url = Some(url.clone());
            }
        }
        SyncTarget::Obsidian => {
            if let Some(path) = &details.note_path {
                status.sync_metadata.obsidian_note_path = Some(path.clone());
            }
        }
        SyncTarget::Files => {}
    }
}
