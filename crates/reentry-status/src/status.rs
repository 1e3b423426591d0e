//! The canonical status record
//!
//! Field names serialize in camelCase because the persisted JSON is
//! shared with non-Rust tooling. Every field carries a serde default so
//! older or partial records load without error; the parser in
//! [`crate::json`] applies the remaining v1.0 normalization.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted schema version of a status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
}

impl SchemaVersion {
    /// Default for records that predate the schemaVersion field.
    pub fn legacy() -> Self {
        Self::V1_0
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1.0" => Some(Self::V1_0),
            "1.1" => Some(Self::V1_1),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1_0 => write!(f, "1.0"),
            Self::V1_1 => write!(f, "1.1"),
        }
    }
}

/// Project lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Planning,
    Development,
    Testing,
    Staging,
    Production,
    Maintenance,
}

impl Phase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "development" => Some(Self::Development),
            "testing" => Some(Self::Testing),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Planning => "planning",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Maintenance => "maintenance",
        };
        write!(f, "{label}")
    }
}

/// What caused a status update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    #[default]
    Manual,
    PostVersion,
    PostRelease,
    Auto,
}

/// Next-step and blocker weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Coarse severity scale shared by blockers and risks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

/// Lifecycle state of a tracked milestone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    #[default]
    Planned,
    Active,
    Done,
}

/// Link to the active milestone in the roadmap document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRef {
    pub id: String,
    pub title: String,
}

/// A tracked milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub state: MilestoneState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// Something currently preventing progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blocker {
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// A concrete next action; the first entry is the "next micro-step".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

/// A known risk with its assessed weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub description: String,
    #[serde(default)]
    pub impact: Severity,
    #[serde(default)]
    pub likelihood: Severity,
}

/// An external dependency the project waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub blocking: bool,
}

/// Snapshot of the git HEAD at update time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    pub branch: String,
    pub commit: String,
    pub author: String,
    #[serde(default = "epoch")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub changed_files: u32,
    #[serde(default)]
    pub diff_summary: String,
}

/// Version bookkeeping carried on the status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(default = "default_version")]
    pub current: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bump_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
}

impl Default for Versioning {
    fn default() -> Self {
        Self {
            current: default_version(),
            previous: None,
            bump_type: None,
            release_date: None,
        }
    }
}

/// Context describing what drove the latest update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContext {
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_info: Option<GitInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning: Option<Versioning>,
}

/// Sync bookkeeping: remote resource ids and last-published hashes.
///
/// `published` is keyed per target (`githubHash`, `obsidianHash`) and
/// holds the content hash of the last successfully published body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsidian_note_path: Option<String>,
    #[serde(default)]
    pub published: BTreeMap<String, String>,
}

/// The canonical re-entry status record, singleton per project scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default = "SchemaVersion::legacy")]
    pub schema_version: SchemaVersion,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "epoch")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default)]
    pub context: UpdateContext,
    /// Active milestone link, or `None` when no milestone is active.
    /// Serialized as an explicit `null` so the JSON shape is stable.
    #[serde(default)]
    pub milestone: Option<MilestoneRef>,
    /// Path to the roadmap document this record references. Empty only
    /// transiently during deserialization; the parser fills the
    /// computed default before a record is handed out.
    #[serde(default)]
    pub roadmap_file: String,
    #[serde(default)]
    pub current_phase: Phase,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub next_steps: Vec<NextStep>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub versioning: Versioning,
    #[serde(default)]
    pub sync_metadata: SyncMetadata,
}

impl Status {
    /// The zero-value record written on first initialization.
    pub fn initial(roadmap_file: impl Into<String>) -> Self {
        Self {
            schema_version: SchemaVersion::V1_1,
            version: default_version(),
            last_updated: epoch(),
            updated_by: String::new(),
            context: UpdateContext::default(),
            milestone: None,
            roadmap_file: roadmap_file.into(),
            current_phase: Phase::Planning,
            milestones: Vec::new(),
            blockers: Vec::new(),
            next_steps: Vec::new(),
            risks: Vec::new(),
            dependencies: Vec::new(),
            versioning: Versioning::default(),
            sync_metadata: SyncMetadata::default(),
        }
    }

    /// Replace the next micro-step (the head of `next_steps`).
    pub fn set_next_step(&mut self, description: impl Into<String>, priority: Priority) {
        let step = NextStep {
            description: description.into(),
            priority,
        };
        if self.next_steps.is_empty() {
            self.next_steps.push(step);
        } else {
            self.next_steps[0] = step;
        }
    }

    /// Point the record at a new active milestone.
    pub fn set_milestone(&mut self, id: impl Into<String>, title: impl Into<String>) {
        self.milestone = Some(MilestoneRef {
            id: id.into(),
            title: title.into(),
        });
    }

    /// Stamp the record as updated now by the given identity.
    pub fn touch(&mut self, updated_by: impl Into<String>) {
        self.updated_by = updated_by.into();
        self.last_updated = Utc::now();
    }
}

pub(crate) fn default_version() -> String {
    "0.0.0".to_string()
}

pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}
