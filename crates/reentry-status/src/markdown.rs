//! Fixed-layout Markdown mirror of the status record
//!
//! Rendering is a pure function of the record: identical input yields
//! byte-identical output, with no embedded timestamps. The parser
//! recovers the printed fields from any rendered document.

use regex::Regex;

use crate::Result;
use crate::status::{MilestoneRef, Phase, Status};

const TITLE: &str = "# Re-entry Status";
const NEXT_STEP_HEADING: &str = "## Next micro-step";
const FOOTER: &str = "_Generated from reentry.status.json; update through the reentry tooling._";

/// Render the Markdown summary for a status record.
///
/// Field order is fixed: Schema, Version, Phase, the next micro-step
/// section, Milestone, Roadmap, and the notes footer.
pub fn render_markdown(status: &Status) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(TITLE.to_string());
    lines.push(String::new());
    lines.push(format!("Schema: {}", status.schema_version));
    lines.push(format!("Version: {}", status.version));
    lines.push(format!("Phase: {}", status.current_phase));
    lines.push(String::new());
    lines.push(NEXT_STEP_HEADING.to_string());
    lines.push(String::new());
    if let Some(step) = status.next_steps.first() {
        lines.push(step.description.clone());
        lines.push(String::new());
    }
    lines.push(format!(
        "Milestone: {}",
        milestone_label(status.milestone.as_ref())
    ));
    lines.push(format!("Roadmap: {}", status.roadmap_file));
    lines.push(String::new());
    lines.push(FOOTER.to_string());

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn milestone_label(milestone: Option<&MilestoneRef>) -> String {
    match milestone {
        Some(m) => format!("{} (id: {})", m.title, m.id),
        None => "—".to_string(),
    }
}

/// The fields recoverable from a rendered Markdown summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub schema_version: Option<String>,
    pub version: Option<String>,
    pub phase: Option<Phase>,
    pub milestone: Option<MilestoneRef>,
    pub roadmap_file: Option<String>,
    pub next_step: Option<String>,
}

/// Parse the printed fields back out of a Markdown summary.
///
/// For any document produced by [`render_markdown`] this recovers the
/// same schema version, version, phase, and roadmap path, and, when
/// non-blank, the same milestone and first next-step description.
///
/// # Errors
///
/// Returns an error only if a field pattern fails to compile.
pub fn parse_markdown(markdown: &str) -> Result<StatusSummary> {
    Ok(StatusSummary {
        schema_version: field(markdown, r"(?m)^Schema:\s*(.+)$")?,
        version: field(markdown, r"(?m)^Version:\s*(.+)$")?,
        phase: field(markdown, r"(?m)^Phase:\s*(.+)$")?.and_then(|p| Phase::parse(&p)),
        milestone: parse_milestone(markdown)?,
        roadmap_file: field(markdown, r"(?m)^Roadmap:\s*(.+)$")?,
        next_step: parse_next_step(markdown),
    })
}

fn field(markdown: &str, pattern: &str) -> Result<Option<String>> {
    let re = Regex::new(pattern)?;
    Ok(re
        .captures(markdown)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string()))
}

fn parse_milestone(markdown: &str) -> Result<Option<MilestoneRef>> {
    let Some(label) = field(markdown, r"(?m)^Milestone:\s*(.+)$")? else {
        return Ok(None);
    };
    if label == "—" {
        return Ok(None);
    }
    let re = Regex::new(r"^(?P<title>.+) \(id: (?P<id>[^)]+)\)$")?;
    Ok(re.captures(&label).map(|c| MilestoneRef {
        id: c["id"].to_string(),
        title: c["title"].to_string(),
    }))
}

/// The first non-empty line between the next-step heading and the
/// following field line.
fn parse_next_step(markdown: &str) -> Option<String> {
    let mut in_section = false;
    for line in markdown.lines() {
        if line.trim() == NEXT_STEP_HEADING {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.starts_with("Milestone:") || line.starts_with('#') {
            return None;
        }
        if !line.trim().is_empty() {
            return Some(line.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{NextStep, Priority, SchemaVersion};
    use pretty_assertions::assert_eq;

    fn sample() -> Status {
        let mut status = Status::initial(".reentry/demo/ROADMAP.md");
        status.version = "1.8.2".into();
        status.current_phase = Phase::Testing;
        status.set_milestone("m-007", "Cutover rehearsal");
        status.next_steps.push(NextStep {
            description: "Re-run the staging smoke suite".into(),
            priority: Priority::High,
        });
        status
    }

    #[test]
    fn rendering_is_deterministic() {
        let status = sample();
        assert_eq!(render_markdown(&status), render_markdown(&status));
    }

    #[test]
    fn rendered_layout_has_fixed_field_order() {
        let rendered = render_markdown(&sample());
        let expected = "\
# Re-entry Status

Schema: 1.1
Version: 1.8.2
Phase: testing

## Next micro-step

Re-run the staging smoke suite

Milestone: Cutover rehearsal (id: m-007)
Roadmap: .reentry/demo/ROADMAP.md

_Generated from reentry.status.json; update through the reentry tooling._
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn parse_recovers_rendered_fields() {
        let status = sample();
        let summary = parse_markdown(&render_markdown(&status)).unwrap();

        assert_eq!(summary.schema_version.as_deref(), Some("1.1"));
        assert_eq!(summary.version.as_deref(), Some("1.8.2"));
        assert_eq!(summary.phase, Some(Phase::Testing));
        assert_eq!(summary.milestone, status.milestone);
        assert_eq!(
            summary.roadmap_file.as_deref(),
            Some(".reentry/demo/ROADMAP.md")
        );
        assert_eq!(
            summary.next_step.as_deref(),
            Some("Re-run the staging smoke suite")
        );
    }

    #[test]
    fn empty_next_steps_render_blank_and_parse_as_none() {
        let mut status = sample();
        status.next_steps.clear();

        let rendered = render_markdown(&status);
        let summary = parse_markdown(&rendered).unwrap();

        assert_eq!(summary.next_step, None);
        assert_eq!(summary.version.as_deref(), Some("1.8.2"));
    }

    #[test]
    fn missing_milestone_renders_em_dash_and_parses_as_none() {
        let mut status = sample();
        status.milestone = None;
        status.schema_version = SchemaVersion::V1_0;

        let rendered = render_markdown(&status);
        assert!(rendered.contains("Milestone: —"));
        assert!(rendered.contains("Schema: 1.0"));

        let summary = parse_markdown(&rendered).unwrap();
        assert_eq!(summary.milestone, None);
        assert_eq!(summary.schema_version.as_deref(), Some("1.0"));
    }

    #[test]
    fn parse_of_unrelated_markdown_yields_empty_summary() {
        let summary = parse_markdown("# Some other document\n\ntext\n").unwrap();
        assert_eq!(summary, StatusSummary::default());
    }
}
