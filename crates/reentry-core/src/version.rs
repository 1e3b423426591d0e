//! Branch-aware version formatting and bumping
//!
//! A branch name resolves to a [`BranchConfig`] by exact match, then by
//! wildcard pattern, then by the configured default branch. Build
//! counters are owned by the [`BranchPolicy`] instance, so independent
//! policies never share state.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use reentry_git::GitProvider;

/// How a version string is rendered for a branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionFormat {
    #[default]
    Semantic,
    Dev,
    Feature,
    Hotfix,
}

/// How a bump advances the version for a branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpStrategy {
    #[default]
    Semantic,
    DevBuild,
    FeatureBranch,
    Hotfix,
}

/// The requested semantic release increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
}

impl ReleaseType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "patch" => Some(Self::Patch),
            "minor" => Some(Self::Minor),
            "major" => Some(Self::Major),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Versioning policy for one branch (or branch pattern).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchConfig {
    pub version_format: VersionFormat,
    pub tag_format: String,
    pub sync_files: Vec<String>,
    pub environment: String,
    pub bump_strategy: BumpStrategy,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            version_format: VersionFormat::Semantic,
            tag_format: "v{version}".to_string(),
            sync_files: Vec::new(),
            environment: "development".to_string(),
            bump_strategy: BumpStrategy::Semantic,
        }
    }
}

/// Branch-to-policy table plus the per-key build counters.
#[derive(Debug, Clone)]
pub struct BranchPolicy {
    branches: BTreeMap<String, BranchConfig>,
    default_branch: String,
    build_counters: HashMap<String, u64>,
}

impl BranchPolicy {
    pub fn new(branches: BTreeMap<String, BranchConfig>, default_branch: impl Into<String>) -> Self {
        Self {
            branches,
            default_branch: default_branch.into(),
            build_counters: HashMap::new(),
        }
    }

    /// Resolve the policy entry for a branch name.
    ///
    /// Tries an exact key match first, then wildcard entries (`*`
    /// expands to `.*`, other metacharacters are escaped, the match is
    /// anchored; patterns are tried in key order), then the default
    /// branch's entry.
    ///
    /// # Errors
    ///
    /// Returns `BranchConfigMissing` when nothing matches and the
    /// default branch has no entry either.
    pub fn detect(&self, branch: &str) -> Result<(&str, &BranchConfig)> {
        if let Some((key, config)) = self.branches.get_key_value(branch) {
            return Ok((key.as_str(), config));
        }

        for (key, config) in &self.branches {
            if key.contains('*') && wildcard_matches(key, branch)? {
                tracing::debug!(pattern = %key, %branch, "wildcard branch match");
                return Ok((key.as_str(), config));
            }
        }

        self.branches
            .get_key_value(&self.default_branch)
            .map(|(key, config)| (key.as_str(), config))
            .ok_or_else(|| Error::BranchConfigMissing {
                branch: branch.to_string(),
            })
    }

    /// Resolve the current branch (explicit target, or from git) and
    /// its policy entry.
    ///
    /// # Errors
    ///
    /// Propagates git failures and unmatched-branch errors.
    pub fn detect_for(
        &self,
        target_branch: Option<&str>,
        git: &dyn GitProvider,
    ) -> Result<(String, BranchConfig)> {
        let branch = match target_branch {
            Some(branch) => branch.to_string(),
            None => git.current_branch()?,
        };
        let (_, config) = self.detect(&branch)?;
        Ok((branch, config.clone()))
    }

    /// Render a base version for a branch.
    ///
    /// `semantic` leaves the base unchanged; `dev` renders
    /// `base-dev.N`; `feature`/`hotfix` render `base-<branch>.N` with
    /// the branch name sanitized into prerelease-safe characters. `N`
    /// is the supplied build number or the next value of the per-key
    /// counter.
    pub fn format_version(
        &mut self,
        base: &str,
        config: &BranchConfig,
        branch: &str,
        build: Option<u64>,
    ) -> String {
        match config.version_format {
            VersionFormat::Semantic => base.to_string(),
            VersionFormat::Dev => {
                let n = self.next_build("dev", build);
                format!("{base}-dev.{n}")
            }
            VersionFormat::Feature | VersionFormat::Hotfix => {
                let slug = sanitize_branch(branch);
                let n = self.next_build(&slug, build);
                format!("{base}-{slug}.{n}")
            }
        }
    }

    /// Bump a version according to the branch's strategy.
    ///
    /// Any existing prerelease/build suffix is stripped first. The
    /// `semantic` strategy increments the clean base per standard
    /// semver rules; the non-production strategies keep the base frozen
    /// and only advance the formatted build suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if `current` is not a valid semantic version.
    pub fn bump(
        &mut self,
        current: &str,
        release: ReleaseType,
        config: &BranchConfig,
        branch: &str,
        build: Option<u64>,
    ) -> Result<String> {
        let parsed = Version::parse(current.trim())?;
        let clean = Version::new(parsed.major, parsed.minor, parsed.patch);

        match config.bump_strategy {
            BumpStrategy::Semantic => {
                let bumped = match release {
                    ReleaseType::Patch => Version::new(clean.major, clean.minor, clean.patch + 1),
                    ReleaseType::Minor => Version::new(clean.major, clean.minor + 1, 0),
                    ReleaseType::Major => Version::new(clean.major + 1, 0, 0),
                };
                Ok(bumped.to_string())
            }
            BumpStrategy::DevBuild | BumpStrategy::FeatureBranch | BumpStrategy::Hotfix => {
                Ok(self.format_version(&clean.to_string(), config, branch, build))
            }
        }
    }

    fn next_build(&mut self, key: &str, explicit: Option<u64>) -> u64 {
        match explicit {
            Some(n) => {
                self.build_counters.insert(key.to_string(), n);
                n
            }
            None => {
                let counter = self.build_counters.entry(key.to_string()).or_insert(0);
                *counter += 1;
                *counter
            }
        }
    }
}

/// Render a tag name for a version using the branch's tag format.
pub fn format_tag(config: &BranchConfig, version: &str) -> String {
    config.tag_format.replace("{version}", version)
}

/// Match a `*` wildcard pattern against a branch name.
fn wildcard_matches(pattern: &str, branch: &str) -> Result<bool> {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    let re = Regex::new(&format!("^{}$", escaped.join(".*")))?;
    Ok(re.is_match(branch))
}

/// Lowercase a branch name into prerelease-safe characters.
fn sanitize_branch(branch: &str) -> String {
    branch
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
