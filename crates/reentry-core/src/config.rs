//! Project-scoped configuration resolution
//!
//! The core never reads a config file itself: it receives the parsed
//! root object and resolves the extension's section out of it, applies
//! any per-project override, and fills defaults last. The two-step
//! source lookup and the merge policy are deliberately explicit so
//! their precedence is testable in isolation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sync::SyncTarget;
use crate::{Error, Result};

/// Key of the extension's section in the root configuration.
pub const EXTENSION_KEY: &str = "reentry-status";

/// Resolved configuration for one project scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReentryConfig {
    /// Master switch; when false no sync targets are active.
    pub enabled: bool,
    /// Whether version-bump hooks trigger a sync automatically.
    pub auto_sync: bool,
    /// Whether a remote sync failure aborts the whole operation.
    pub fail_hard: bool,
    pub hooks: HooksConfig,
    pub files: FilesConfig,
    pub github: Option<GithubConfig>,
    pub obsidian: Option<ObsidianConfig>,
    pub template: Option<TemplateConfig>,
}

impl Default for ReentryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_sync: true,
            fail_hard: false,
            hooks: HooksConfig::default(),
            files: FilesConfig::default(),
            github: None,
            obsidian: None,
            template: None,
        }
    }
}

/// Which version-lifecycle hooks are wired to a sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HooksConfig {
    pub post_version: bool,
    pub post_release: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            post_version: true,
            post_release: true,
        }
    }
}

/// Paths of the persisted file pair and the roadmap document.
///
/// Empty paths are placeholders filled by [`load_config`] with the
/// scope-dependent defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilesConfig {
    pub json_path: String,
    pub markdown_path: String,
    pub roadmap_path: String,
}

/// GitHub sync target settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GithubConfig {
    pub enabled: bool,
    pub owner: String,
    pub repo: String,
    pub issue: IssueConfig,
    pub auth: AuthConfig,
}

/// Settings of the tracking issue the GitHub adapter maintains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueConfig {
    pub title: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

/// Authentication for the GitHub transport client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    pub token: String,
}

/// Obsidian sync target settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObsidianConfig {
    pub enabled: bool,
    pub vault_path: String,
    pub note_path: String,
    /// Optional frontmatter rendered at the top of the note.
    pub frontmatter: Option<Value>,
}

/// Roadmap template settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateConfig {
    pub title: Option<String>,
    pub custom_sections: Vec<String>,
}

/// Resolve the extension's section from the root configuration object.
///
/// Checks `extensionConfig["reentry-status"]` first, then the legacy
/// top-level `"reentry-status"` key.
pub fn resolve_section(root: &Value) -> Option<&Value> {
    if let Some(section) = root.get("extensionConfig").and_then(|c| c.get(EXTENSION_KEY)) {
        tracing::debug!("config source: extensionConfig.{EXTENSION_KEY}");
        return Some(section);
    }
    let section = root.get(EXTENSION_KEY);
    if section.is_some() {
        tracing::debug!("config source: legacy top-level {EXTENSION_KEY}");
    }
    section
}

/// Canonicalize an arbitrary project identifier to a scope key.
///
/// Takes the last segment of a scoped package name (`@scope/name`) or a
/// path-like id (`apps/trading`), lowercased.
pub fn canonical_project_key(project: &str) -> String {
    let trimmed = project.trim().trim_end_matches('/');
    trimmed
        .rsplit('/')
        .next()
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Load the resolved configuration for a project scope.
///
/// Looks up the extension section, deep-merges a matching
/// `projects[<canonical key>]` override over the base, and fills path
/// defaults under the per-project directory (or the unscoped default
/// when no project is given).
///
/// # Errors
///
/// Returns an error if the section or an override has the wrong shape.
pub fn load_config(root: &Value, project: Option<&str>) -> Result<ReentryConfig> {
    let mut base = match resolve_section(root) {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(Error::Config {
                message: format!("{EXTENSION_KEY} section must be an object"),
            });
        }
        None => Map::new(),
    };

    let projects = base.remove("projects");
    let key = project.map(canonical_project_key);

    if let (Some(key), Some(Value::Object(projects))) = (&key, &projects)
        && let Some(override_value) = projects.get(key)
    {
        tracing::debug!(project = %key, "applying project override");
        merge_project_override(&mut base, override_value);
    }

    let mut config: ReentryConfig = serde_json::from_value(Value::Object(base))?;
    apply_path_defaults(&mut config, key.as_deref());
    Ok(config)
}

/// Merge a project override over the base section.
///
/// The override wins per top-level field. `hooks`, `files`, and
/// `template` are merged key-by-key (so a `template.customSections`
/// override replaces the whole list); `github`, `obsidian`, and every
/// other field are replaced wholesale.
fn merge_project_override(base: &mut Map<String, Value>, override_value: &Value) {
    let Some(over_map) = override_value.as_object() else {
        return;
    };
    for (field, over_val) in over_map {
        match field.as_str() {
            "hooks" | "files" | "template" => match base.get_mut(field) {
                Some(base_val) => merge_keys(base_val, over_val),
                None => {
                    base.insert(field.clone(), over_val.clone());
                }
            },
            _ => {
                base.insert(field.clone(), over_val.clone());
            }
        }
    }
}

/// Shallow key-wise merge of two JSON objects; the override wins per key.
fn merge_keys(base: &mut Value, override_value: &Value) {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            for (key, val) in over_map {
                base_map.insert(key.clone(), val.clone());
            }
        }
        (base, other) => *base = other.clone(),
    }
}

fn apply_path_defaults(config: &mut ReentryConfig, project_key: Option<&str>) {
    let scope = match project_key {
        Some(key) => format!(".reentry/{key}"),
        None => ".reentry".to_string(),
    };
    if config.files.json_path.is_empty() {
        config.files.json_path = format!("{scope}/reentry.status.json");
    }
    if config.files.markdown_path.is_empty() {
        config.files.markdown_path = format!("{scope}/REENTRY.md");
    }
    if config.files.roadmap_path.is_empty() {
        config.files.roadmap_path = format!("{scope}/ROADMAP.md");
    }
}

/// Result of a configuration validation pass.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate the enabled sync targets.
///
/// Returns human-readable error strings and never fails hard; callers
/// decide whether to abort.
pub fn validate_config(config: &ReentryConfig) -> Validation {
    let mut errors = Vec::new();

    if let Some(github) = &config.github
        && github.enabled
    {
        if github.owner.trim().is_empty() {
            errors.push("github.owner must be set when GitHub sync is enabled".to_string());
        }
        if github.repo.trim().is_empty() {
            errors.push("github.repo must be set when GitHub sync is enabled".to_string());
        }
        if github.issue.title.trim().is_empty() {
            errors.push("github.issue.title must be set when GitHub sync is enabled".to_string());
        }
        if github.auth.token.trim().is_empty() {
            errors.push("github.auth.token must be set when GitHub sync is enabled".to_string());
        }
    }

    if let Some(obsidian) = &config.obsidian
        && obsidian.enabled
    {
        if obsidian.vault_path.trim().is_empty() {
            errors.push("obsidian.vaultPath must be set when Obsidian sync is enabled".to_string());
        }
        if obsidian.note_path.trim().is_empty() {
            errors.push("obsidian.notePath must be set when Obsidian sync is enabled".to_string());
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

/// The sync targets active under a configuration, in sync order.
pub fn sync_targets(config: &ReentryConfig) -> Vec<SyncTarget> {
    if !config.enabled {
        return Vec::new();
    }
    let mut targets = vec![SyncTarget::Files];
    if config.github.as_ref().is_some_and(|g| g.enabled) {
        targets.push(SyncTarget::Github);
    }
    if config.obsidian.as_ref().is_some_and(|o| o.enabled) {
        targets.push(SyncTarget::Obsidian);
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("@myorg/trading", "trading")]
    #[case("apps/Trading", "trading")]
    #[case("Dashboard", "dashboard")]
    #[case("tools/cleanup/", "cleanup")]
    fn test_canonical_project_key(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_project_key(input), expected);
    }

    #[test]
    fn test_resolve_section_prefers_extension_config() {
        let root = json!({
            "extensionConfig": { "reentry-status": { "enabled": true, "failHard": true } },
            "reentry-status": { "enabled": false }
        });
        let section = resolve_section(&root).unwrap();
        assert_eq!(section["failHard"], true);
    }

    #[test]
    fn test_resolve_section_falls_back_to_legacy_key() {
        let root = json!({ "reentry-status": { "autoSync": false } });
        let section = resolve_section(&root).unwrap();
        assert_eq!(section["autoSync"], false);
    }

    #[test]
    fn test_load_config_defaults_when_section_missing() {
        let config = load_config(&json!({}), None).unwrap();
        assert!(config.enabled);
        assert!(config.auto_sync);
        assert!(!config.fail_hard);
        assert!(config.hooks.post_version);
        assert_eq!(config.files.json_path, ".reentry/reentry.status.json");
        assert_eq!(config.files.markdown_path, ".reentry/REENTRY.md");
        assert_eq!(config.files.roadmap_path, ".reentry/ROADMAP.md");
        assert!(config.github.is_none());
    }

    #[test]
    fn test_load_config_scopes_paths_per_project() {
        let config = load_config(&json!({}), Some("@myorg/trading")).unwrap();
        assert_eq!(
            config.files.json_path,
            ".reentry/trading/reentry.status.json"
        );
        assert_eq!(config.files.markdown_path, ".reentry/trading/REENTRY.md");
        assert_eq!(config.files.roadmap_path, ".reentry/trading/ROADMAP.md");
    }

    #[test]
    fn test_project_override_merges_files_key_wise() {
        let root = json!({
            "reentry-status": {
                "failHard": false,
                "files": { "jsonPath": "base/status.json", "markdownPath": "base/STATUS.md" },
                "projects": {
                    "trading": {
                        "failHard": true,
                        "files": { "markdownPath": "trading/STATUS.md" }
                    }
                }
            }
        });
        let config = load_config(&root, Some("apps/trading")).unwrap();

        assert!(config.fail_hard);
        // base jsonPath survives, markdownPath overridden
        assert_eq!(config.files.json_path, "base/status.json");
        assert_eq!(config.files.markdown_path, "trading/STATUS.md");
    }

    #[test]
    fn test_project_override_replaces_github_wholesale() {
        let root = json!({
            "reentry-status": {
                "github": {
                    "enabled": true,
                    "owner": "base-owner",
                    "repo": "base-repo",
                    "issue": { "title": "Base" },
                    "auth": { "token": "t" }
                },
                "projects": {
                    "trading": {
                        "github": { "enabled": true, "owner": "trading-owner" }
                    }
                }
            }
        });
        let config = load_config(&root, Some("trading")).unwrap();
        let github = config.github.unwrap();

        assert_eq!(github.owner, "trading-owner");
        // wholesale replacement: base repo does not leak through
        assert_eq!(github.repo, "");
    }

    #[test]
    fn test_project_override_replaces_custom_sections_wholesale() {
        let root = json!({
            "reentry-status": {
                "template": { "title": "Base Roadmap", "customSections": ["A", "B"] },
                "projects": {
                    "trading": { "template": { "customSections": ["C"] } }
                }
            }
        });
        let config = load_config(&root, Some("trading")).unwrap();
        let template = config.template.unwrap();

        assert_eq!(template.title.as_deref(), Some("Base Roadmap"));
        assert_eq!(template.custom_sections, vec!["C"]);
    }

    #[test]
    fn test_override_for_other_project_is_ignored() {
        let root = json!({
            "reentry-status": {
                "failHard": false,
                "projects": { "dashboard": { "failHard": true } }
            }
        });
        let config = load_config(&root, Some("trading")).unwrap();
        assert!(!config.fail_hard);
    }

    #[test]
    fn test_non_object_section_is_an_error() {
        let root = json!({ "reentry-status": "yes" });
        assert!(load_config(&root, None).is_err());
    }

    #[test]
    fn test_validate_enabled_github_requires_fields() {
        let mut config = ReentryConfig::default();
        config.github = Some(GithubConfig {
            enabled: true,
            ..GithubConfig::default()
        });

        let validation = validate_config(&config);

        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 4);
        assert!(validation.errors.iter().any(|e| e.contains("github.owner")));
    }

    #[test]
    fn test_validate_disabled_targets_are_skipped() {
        let mut config = ReentryConfig::default();
        config.github = Some(GithubConfig::default());
        config.obsidian = Some(ObsidianConfig::default());

        let validation = validate_config(&config);
        assert!(validation.valid);
        assert!(validation.errors.is_empty());
    }

    #[test]
    fn test_validate_enabled_obsidian_requires_paths() {
        let mut config = ReentryConfig::default();
        config.obsidian = Some(ObsidianConfig {
            enabled: true,
            vault_path: "~/vault".into(),
            note_path: String::new(),
            frontmatter: None,
        });

        let validation = validate_config(&config);
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].contains("obsidian.notePath"));
    }

    #[test]
    fn test_sync_targets_follow_enabled_flags() {
        let mut config = ReentryConfig::default();
        assert_eq!(sync_targets(&config), vec![SyncTarget::Files]);

        config.github = Some(GithubConfig {
            enabled: true,
            ..GithubConfig::default()
        });
        config.obsidian = Some(ObsidianConfig {
            enabled: true,
            vault_path: "~/vault".into(),
            note_path: "status.md".into(),
            frontmatter: None,
        });
        assert_eq!(
            sync_targets(&config),
            vec![SyncTarget::Files, SyncTarget::Github, SyncTarget::Obsidian]
        );

        config.enabled = false;
        assert!(sync_targets(&config).is_empty());
    }
}
