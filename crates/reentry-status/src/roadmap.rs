//! Roadmap document template and managed block
//!
//! The roadmap is a free-form document owned by the user, except for one
//! delimited block this module maintains. Creation uses the full
//! template; afterwards only the region between the markers is ever
//! rewritten, and content outside them is preserved byte-for-byte.

use crate::status::Status;

/// Opening marker of the managed block.
pub const MANAGED_START: &str = "<!-- roadmap:managed:start -->";
/// Closing marker of the managed block.
pub const MANAGED_END: &str = "<!-- roadmap:managed:end -->";

/// Options for the first-time roadmap scaffold.
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Document title (H1).
    pub title: String,
    /// Extra section headings appended after the standard scaffold.
    pub custom_sections: Vec<String>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            title: "Roadmap".to_string(),
            custom_sections: Vec::new(),
        }
    }
}

/// Render the managed block for a status record.
///
/// Deterministic: shows the roadmap path and the active milestone (or
/// `—`), never a timestamp.
pub fn render_managed_block(status: Option<&Status>) -> String {
    let milestone = status
        .and_then(|s| s.milestone.as_ref())
        .map(|m| format!("{} (id: {})", m.title, m.id))
        .unwrap_or_else(|| "—".to_string());
    let tracked_in = status.map(|s| s.roadmap_file.as_str()).unwrap_or("—");

    format!(
        "{MANAGED_START}\n\
         **Active milestone:** {milestone}\n\
         **Tracked in:** {tracked_in}\n\
         {MANAGED_END}"
    )
}

/// Render a complete new roadmap document.
pub fn render_template(options: &TemplateOptions, status: Option<&Status>) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", options.title));
    out.push_str(&render_managed_block(status));
    out.push_str("\n\n## North Star\n\n_What finished looks like._\n");
    out.push_str("\n## Now\n\n## Next\n\n## Later\n");
    for section in &options.custom_sections {
        out.push_str(&format!("\n## {section}\n"));
    }
    out
}

/// Outcome of a managed-block upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub content: String,
    pub changed: bool,
}

/// Replace the managed block in an existing document, or insert one.
///
/// When both markers are present only the region between them (markers
/// included) is replaced; everything before and after is preserved
/// exactly. When absent, the block is inserted after the first H1 with
/// one blank line on each side (never duplicating a blank line the
/// document already has), or prepended when there is no H1.
///
/// `changed` is false only when the new block is textually identical to
/// the old one.
pub fn upsert_managed_block(existing: &str, status: Option<&Status>) -> Upsert {
    let block = render_managed_block(status);

    let region = existing.find(MANAGED_START).and_then(|start| {
        existing[start..]
            .find(MANAGED_END)
            .map(|offset| (start, start + offset + MANAGED_END.len()))
    });

    match region {
        Some((start, end)) => {
            let current = &existing[start..end];
            if current == block {
                return Upsert {
                    content: existing.to_string(),
                    changed: false,
                };
            }
            let mut content = String::with_capacity(existing.len() + block.len());
            content.push_str(&existing[..start]);
            content.push_str(&block);
            content.push_str(&existing[end..]);
            Upsert {
                content,
                changed: true,
            }
        }
        None => Upsert {
            content: insert_block(existing, &block),
            changed: true,
        },
    }
}

/// Insert the block after the first H1, or prepend when there is none.
fn insert_block(existing: &str, block: &str) -> String {
    let lines: Vec<&str> = existing.lines().collect();
    let h1 = lines.iter().position(|l| l.starts_with("# "));

    let mut out = String::with_capacity(existing.len() + block.len() + 2);
    match h1 {
        Some(idx) => {
            for line in &lines[..=idx] {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(block);
            out.push('\n');

            // one blank line of separation, not two
            let mut rest = &lines[idx + 1..];
            if rest.first().is_some_and(|l| l.trim().is_empty()) {
                rest = &rest[1..];
            }
            if !rest.is_empty() {
                out.push('\n');
                for line in rest {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        None => {
            out.push_str(block);
            out.push('\n');
            if !existing.is_empty() {
                out.push('\n');
                out.push_str(existing);
            }
        }
    }
    out
}
