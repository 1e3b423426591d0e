//! Canonical re-entry status record and its renderers
//!
//! The [`Status`] record is persisted as JSON (source of truth) and
//! mirrored to a fixed-layout Markdown summary. A third renderer owns
//! the managed block inside the free-form roadmap document.

pub mod error;
pub mod json;
pub mod markdown;
pub mod roadmap;
pub mod status;

pub use error::{Error, Result};
pub use json::{parse_json, render_json};
pub use markdown::{StatusSummary, parse_markdown, render_markdown};
pub use roadmap::{
    MANAGED_END, MANAGED_START, TemplateOptions, Upsert, render_managed_block, render_template,
    upsert_managed_block,
};
pub use status::{
    Blocker, Dependency, GitInfo, Milestone, MilestoneRef, MilestoneState, NextStep, Phase,
    Priority, Risk, SchemaVersion, Severity, Status, SyncMetadata, Trigger, UpdateContext,
    Versioning,
};
