//! JSON rendering and tolerant parsing of the status record
//!
//! The rendered JSON is the source of truth on disk. Object keys are
//! sorted recursively so diffs stay stable no matter what produced the
//! record, and the output always ends with a trailing newline.

use serde_json::Value;

use crate::Result;
use crate::status::Status;

/// Render a status record as canonical JSON.
///
/// Keys are deep-sorted, the document is pretty-printed with 2-space
/// indentation, and a trailing newline is appended.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(status: &Status) -> Result<String> {
    let value = serde_json::to_value(status)?;
    let mut rendered = serde_json::to_string_pretty(&sort_keys(value))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Parse a persisted status record, tolerating older shapes.
///
/// - missing `schemaVersion` defaults to `"1.0"`
/// - missing collections default to empty
/// - missing `milestone` defaults to `None`
/// - missing `roadmapFile` defaults to `default_roadmap`
///
/// The stored schema version is preserved as-is: normalizing a v1.0
/// record on load never makes the on-disk pair dirty by itself.
///
/// # Errors
///
/// Returns an error if the content is not valid JSON or a present field
/// has the wrong shape.
pub fn parse_json(raw: &str, default_roadmap: &str) -> Result<Status> {
    let mut status: Status = serde_json::from_str(raw)?;
    if status.roadmap_file.is_empty() {
        status.roadmap_file = default_roadmap.to_string();
    }
    Ok(status)
}

/// Recursively sort object keys. Array order is preserved.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::new();
            for (key, val) in entries {
                sorted.insert(key, sort_keys(val));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{
        Blocker, Dependency, Milestone, MilestoneState, NextStep, Phase, Priority, Risk,
        SchemaVersion, Severity, Trigger,
    };
    use pretty_assertions::assert_eq;

    fn sample() -> Status {
        let mut status = Status::initial(".reentry/demo/ROADMAP.md");
        status.version = "1.4.0".into();
        status.current_phase = Phase::Development;
        status.updated_by = "ci".into();
        status.context.trigger = Trigger::PostVersion;
        status.context.command = Some("version".into());
        status.set_milestone("m-002", "Beta hardening");
        status.milestones.push(Milestone {
            id: "m-002".into(),
            title: "Beta hardening".into(),
            state: MilestoneState::Active,
            due: Some("2026-09-01".into()),
        });
        status.blockers.push(Blocker {
            description: "flaky auth tests".into(),
            severity: Severity::High,
            owner: Some("kim".into()),
        });
        status.next_steps.push(NextStep {
            description: "plan the rollout".into(),
            priority: Priority::High,
        });
        status.risks.push(Risk {
            description: "vendor API deprecation".into(),
            impact: Severity::High,
            likelihood: Severity::Low,
        });
        status.dependencies.push(Dependency {
            name: "billing-service".into(),
            version: Some(">=2.1".into()),
            blocking: true,
        });
        status.versioning.previous = Some("1.3.9".into());
        status.versioning.bump_type = Some("minor".into());
        status
            .sync_metadata
            .published
            .insert("githubHash".into(), "abc123".into());
        status
    }

    #[test]
    fn round_trip_preserves_the_record() {
        let status = sample();
        let rendered = render_json(&status).unwrap();
        let parsed = parse_json(&rendered, "unused-default.md").unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn rendered_json_is_key_sorted_and_newline_terminated() {
        let rendered = render_json(&sample()).unwrap();
        assert!(rendered.ends_with('\n'));

        // top-level keys appear in lexicographic order
        let blockers = rendered.find("\"blockers\"").unwrap();
        let context = rendered.find("\"context\"").unwrap();
        let version = rendered.find("\"version\"").unwrap();
        assert!(blockers < context);
        assert!(context < version);
    }

    #[test]
    fn rendering_twice_is_identical() {
        let status = sample();
        assert_eq!(render_json(&status).unwrap(), render_json(&status).unwrap());
    }

    #[test]
    fn missing_schema_version_defaults_to_1_0() {
        let parsed = parse_json(r#"{"version": "0.3.1"}"#, "ROADMAP.md").unwrap();
        assert_eq!(parsed.schema_version, SchemaVersion::V1_0);
        assert_eq!(parsed.version, "0.3.1");
        assert!(parsed.milestones.is_empty());
        assert!(parsed.next_steps.is_empty());
    }

    #[test]
    fn v1_0_record_gains_milestone_and_roadmap_defaults() {
        let raw = r#"{
  "schemaVersion": "1.0",
  "version": "2.1.0",
  "currentPhase": "production"
}"#;
        let parsed = parse_json(raw, ".reentry/legacy/ROADMAP.md").unwrap();
        assert_eq!(parsed.schema_version, SchemaVersion::V1_0);
        assert!(parsed.milestone.is_none());
        assert_eq!(parsed.roadmap_file, ".reentry/legacy/ROADMAP.md");
        assert_eq!(parsed.current_phase, Phase::Production);
    }

    #[test]
    fn explicit_roadmap_file_is_kept() {
        let raw = r#"{"schemaVersion": "1.1", "roadmapFile": "docs/ROADMAP.md"}"#;
        let parsed = parse_json(raw, ".reentry/ROADMAP.md").unwrap();
        assert_eq!(parsed.roadmap_file, "docs/ROADMAP.md");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_json("not json", "ROADMAP.md").is_err());
    }
}
