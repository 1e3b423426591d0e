//! Obsidian sync adapter
//!
//! Publishes the status summary as a vault note, optionally prefixed
//! with a deterministic YAML frontmatter block built from config. The
//! availability probe runs before any note operation, but never before
//! the hash check: an unchanged body costs zero bridge calls.

use std::time::Instant;

use serde_json::Value;

use crate::Result;
use crate::config::ObsidianConfig;
use crate::sync::{SyncAction, SyncDetails, SyncResult, SyncTarget, TargetSyncer, published_key};
use reentry_fs::{content_hash, text_eq};
use reentry_status::Status;

/// A note as seen by the Obsidian bridge.
#[derive(Debug, Clone)]
pub struct Note {
    pub path: String,
    pub content: String,
}

/// Transport seam to the Obsidian command-line bridge.
pub trait ObsidianClient {
    /// Probe the bridge. Must succeed before any note operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ObsidianUnavailable`] when the bridge is
    /// missing or not responding.
    fn check_available(&self) -> Result<()>;

    fn get_note(&self, vault_path: &str, note_path: &str) -> Result<Option<Note>>;

    fn upsert_note(&self, vault_path: &str, note_path: &str, content: &str) -> Result<Note>;
}

/// Sync adapter publishing the status summary to an Obsidian vault.
pub struct ObsidianSyncer {
    config: ObsidianConfig,
    client: Box<dyn ObsidianClient>,
}

impl ObsidianSyncer {
    pub fn new(config: ObsidianConfig, client: Box<dyn ObsidianClient>) -> Self {
        Self { config, client }
    }

    /// The note body: optional frontmatter followed by the Markdown.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested frontmatter value cannot be
    /// serialized.
    pub fn render_body(&self, markdown: &str) -> Result<String> {
        match &self.config.frontmatter {
            Some(Value::Object(map)) if !map.is_empty() => {
                Ok(format!("---\n{}---\n\n{markdown}", render_frontmatter(map)?))
            }
            _ => Ok(markdown.to_string()),
        }
    }
}

/// Serialize frontmatter deterministically: keys sorted, scalars
/// inline, arrays as YAML list items, nested objects as inline JSON.
fn render_frontmatter(map: &serde_json::Map<String, Value>) -> Result<String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        match &map[key.as_str()] {
            Value::Array(items) => {
                out.push_str(key);
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - ");
                    out.push_str(&scalar(item)?);
                    out.push('\n');
                }
            }
            value => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&scalar(value)?);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

fn scalar(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(_) => Ok(serde_json::to_string(value)?),
        other => Ok(other.to_string()),
    }
}

impl TargetSyncer for ObsidianSyncer {
    fn target(&self) -> SyncTarget {
        SyncTarget::Obsidian
    }

    fn sync(&self, status: &Status, markdown: &str) -> Result<SyncResult> {
        let started = Instant::now();
        let body = self.render_body(markdown)?;
        let hash = content_hash(&body);

        let key = published_key(SyncTarget::Obsidian);
        if status.sync_metadata.published.get(key) == Some(&hash) {
            tracing::debug!("obsidian note unchanged (hash), skipping");
            return Ok(SyncResult::succeeded(
                SyncTarget::Obsidian,
                SyncDetails::skipped("unchanged (hash)"),
                started.elapsed(),
            ));
        }

        self.client.check_available()?;

        let existing = self
            .client
            .get_note(&self.config.vault_path, &self.config.note_path)?;

        match existing {
            Some(note) if text_eq(&note.content, &body) => {
                tracing::debug!(path = %note.path, "obsidian note unchanged (content), skipping");
                Ok(SyncResult::succeeded(
                    SyncTarget::Obsidian,
                    SyncDetails::skipped("unchanged (content)").with_note(note.path),
                    started.elapsed(),
                ))
            }
            existing => {
                let action = if existing.is_some() {
                    SyncAction::Updated
                } else {
                    SyncAction::Created
                };
                let written = self.client.upsert_note(
                    &self.config.vault_path,
                    &self.config.note_path,
                    &body,
                )?;
                tracing::info!(path = %written.path, "published obsidian note");
                Ok(SyncResult::succeeded(
                    SyncTarget::Obsidian,
                    SyncDetails::new(action).with_hash(hash).with_note(written.path),
                    started.elapsed(),
                ))
            }
        }
    }
}
