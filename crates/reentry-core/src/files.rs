//! Atomic persistence of the status pair and the roadmap document
//!
//! The JSON file is the source of truth and the Markdown file its
//! mirror; callers must never observe a pair where one reflects a newer
//! status than the other. Both temp files are staged before either move
//! happens, the JSON moves first, and a failed Markdown move rolls the
//! JSON back to its prior bytes.

use std::fs;
use std::path::Path;

use crate::Result;
use crate::config::ReentryConfig;
use reentry_fs::text_eq;
use reentry_status::{
    Status, TemplateOptions, parse_json, render_json, render_markdown, render_template,
    upsert_managed_block,
};

/// Outcome of a status-pair write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub changed: bool,
}

/// Read the persisted status record, or `None` when not initialized.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_status(config: &ReentryConfig) -> Result<Option<Status>> {
    let path = Path::new(&config.files.json_path);
    match reentry_fs::read_text_if_exists(path)? {
        Some(raw) => Ok(Some(parse_json(&raw, &config.files.roadmap_path)?)),
        None => Ok(None),
    }
}

/// Persist the JSON + Markdown pair atomically and idempotently.
///
/// When both rendered bodies match what is on disk (EOL-insensitive),
/// no I/O happens at all.
///
/// # Errors
///
/// Any persistence failure is fatal and re-thrown. If the Markdown move
/// fails after the JSON move succeeded, the JSON file is restored to
/// its prior content (or removed when it did not exist) before the
/// original error propagates.
pub fn write_status_files(config: &ReentryConfig, status: &Status) -> Result<WriteOutcome> {
    let json_path = Path::new(&config.files.json_path);
    let markdown_path = Path::new(&config.files.markdown_path);

    let next_json = render_json(status)?;
    let next_markdown = render_markdown(status);

    let prior_json = reentry_fs::read_text_if_exists(json_path)?;
    // the mirror's prior content only feeds the unchanged check; an
    // unreadable mirror is simply treated as dirty and rewritten
    let prior_markdown = reentry_fs::read_text_if_exists(markdown_path)
        .ok()
        .flatten();

    let json_unchanged = prior_json.as_deref().is_some_and(|p| text_eq(p, &next_json));
    let markdown_unchanged = prior_markdown
        .as_deref()
        .is_some_and(|p| text_eq(p, &next_markdown));
    if json_unchanged && markdown_unchanged {
        tracing::debug!(path = %json_path.display(), "status pair unchanged, skipping write");
        return Ok(WriteOutcome { changed: false });
    }

    // Stage both temp files before moving either.
    reentry_fs::stage(json_path, &next_json)?;
    if let Err(e) = reentry_fs::stage(markdown_path, &next_markdown) {
        reentry_fs::discard(json_path);
        return Err(e.into());
    }

    // JSON moves first; Markdown only if that succeeded.
    if let Err(e) = reentry_fs::promote(json_path) {
        reentry_fs::discard(json_path);
        reentry_fs::discard(markdown_path);
        return Err(e.into());
    }
    if let Err(e) = reentry_fs::promote(markdown_path) {
        rollback_json(json_path, prior_json.as_deref());
        reentry_fs::discard(markdown_path);
        return Err(e.into());
    }

    Ok(WriteOutcome { changed: true })
}

/// Best-effort restore of the JSON file after a failed Markdown move.
fn rollback_json(json_path: &Path, prior: Option<&str>) {
    let restored = match prior {
        Some(content) => fs::write(json_path, content),
        None => fs::remove_file(json_path),
    };
    if let Err(e) = restored {
        tracing::warn!(path = %json_path.display(), error = %e, "json rollback failed");
    }
}

/// Make sure the roadmap document exists and its managed block is
/// current. Returns whether anything was written.
///
/// # Errors
///
/// Returns an error if the document cannot be read or written.
pub fn ensure_roadmap(config: &ReentryConfig, status: &Status) -> Result<bool> {
    let path = Path::new(&status.roadmap_file);
    match reentry_fs::read_text_if_exists(path)? {
        None => {
            let options = template_options(config);
            let document = render_template(&options, Some(status));
            reentry_fs::write_atomic(path, &document)?;
            tracing::info!(path = %path.display(), "created roadmap document");
            Ok(true)
        }
        Some(existing) => {
            let upsert = upsert_managed_block(&existing, Some(status));
            if upsert.changed {
                reentry_fs::write_atomic(path, &upsert.content)?;
                tracing::debug!(path = %path.display(), "updated roadmap managed block");
            }
            Ok(upsert.changed)
        }
    }
}

fn template_options(config: &ReentryConfig) -> TemplateOptions {
    let defaults = TemplateOptions::default();
    match &config.template {
        Some(template) => TemplateOptions {
            title: template.title.clone().unwrap_or(defaults.title),
            custom_sections: template.custom_sections.clone(),
        },
        None => defaults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilesConfig, TemplateConfig};
    use pretty_assertions::assert_eq;
    use reentry_status::Phase;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> ReentryConfig {
        let root = dir.path().to_string_lossy().to_string();
        ReentryConfig {
            files: FilesConfig {
                json_path: format!("{root}/reentry.status.json"),
                markdown_path: format!("{root}/REENTRY.md"),
                roadmap_path: format!("{root}/ROADMAP.md"),
            },
            ..ReentryConfig::default()
        }
    }

    fn sample_status(config: &ReentryConfig) -> Status {
        let mut status = Status::initial(&config.files.roadmap_path);
        status.version = "1.1.0".into();
        status.current_phase = Phase::Development;
        status
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let status = sample_status(&config);

        let outcome = write_status_files(&config, &status).unwrap();
        assert!(outcome.changed);

        let loaded = read_status(&config).unwrap().unwrap();
        assert_eq!(loaded, status);
    }

    #[test]
    fn test_read_missing_status_is_none() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        assert!(read_status(&config).unwrap().is_none());
    }

    #[test]
    fn test_second_write_with_same_status_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let status = sample_status(&config);

        assert!(write_status_files(&config, &status).unwrap().changed);
        assert!(!write_status_files(&config, &status).unwrap().changed);

        // no temp residue from the skipped write
        assert!(!dir.path().join("reentry.status.json.tmp").exists());
        assert!(!dir.path().join("REENTRY.md.tmp").exists());
    }

    #[test]
    fn test_failed_markdown_move_rolls_back_json() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let status = sample_status(&config);

        write_status_files(&config, &status).unwrap();
        let prior_json = fs::read_to_string(&config.files.json_path).unwrap();

        // replace the markdown file with a directory so the rename
        // onto it must fail after the json move succeeded
        fs::remove_file(&config.files.markdown_path).unwrap();
        fs::create_dir(&config.files.markdown_path).unwrap();

        let mut updated = status.clone();
        updated.version = "1.2.0".into();
        let error = write_status_files(&config, &updated);
        assert!(error.is_err());

        let json_after = fs::read_to_string(&config.files.json_path).unwrap();
        assert_eq!(json_after, prior_json);
        assert!(!dir.path().join("REENTRY.md.tmp").exists());
        assert!(!dir.path().join("reentry.status.json.tmp").exists());
    }

    #[test]
    fn test_failed_markdown_move_removes_fresh_json() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let status = sample_status(&config);

        // markdown target blocked before the very first write
        fs::create_dir(&config.files.markdown_path).unwrap();

        assert!(write_status_files(&config, &status).is_err());
        assert!(!Path::new(&config.files.json_path).exists());
    }

    #[test]
    fn test_ensure_roadmap_creates_document_from_template() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.template = Some(TemplateConfig {
            title: Some("Demo Roadmap".into()),
            custom_sections: vec!["Parked".into()],
        });
        let status = sample_status(&config);

        let changed = ensure_roadmap(&config, &status).unwrap();
        assert!(changed);

        let document = fs::read_to_string(&config.files.roadmap_path).unwrap();
        assert!(document.starts_with("# Demo Roadmap\n"));
        assert!(document.contains("## Parked"));
        assert!(document.contains("<!-- roadmap:managed:start -->"));
    }

    #[test]
    fn test_ensure_roadmap_touches_only_the_managed_block() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let mut status = sample_status(&config);

        ensure_roadmap(&config, &status).unwrap();
        let original = fs::read_to_string(&config.files.roadmap_path).unwrap();
        let with_user_content = format!("{original}\nUSER CUSTOM LINE\n");
        fs::write(&config.files.roadmap_path, &with_user_content).unwrap();

        // unchanged status leaves the file alone
        assert!(!ensure_roadmap(&config, &status).unwrap());

        status.set_milestone("m-009", "Launch window");
        assert!(ensure_roadmap(&config, &status).unwrap());

        let document = fs::read_to_string(&config.files.roadmap_path).unwrap();
        assert!(document.contains("USER CUSTOM LINE"));
        assert!(document.contains("Launch window (id: m-009)"));
    }
}
