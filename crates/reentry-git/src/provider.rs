//! Branch and HEAD snapshot provider

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use git2::Repository;

use crate::{Error, Result};
use reentry_status::GitInfo;

/// Trait for the git information the core consumes.
///
/// Kept narrow on purpose: the status manager only needs to know which
/// branch it is on and what HEAD looks like.
pub trait GitProvider {
    /// Name of the currently checked-out branch.
    ///
    /// On a detached HEAD the short commit id is returned instead.
    fn current_branch(&self) -> Result<String>;

    /// Snapshot of the HEAD commit for the update context.
    fn head_info(&self) -> Result<GitInfo>;
}

/// Git provider backed by a local repository on disk.
pub struct LocalRepo {
    root: PathBuf,
}

impl LocalRepo {
    /// Open the repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns `NotARepository` if `root` is not inside a git repository.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        Repository::open(&root).map_err(|_| Error::NotARepository { path: root.clone() })?;
        Ok(Self { root })
    }

    fn repository(&self) -> Result<Repository> {
        Ok(Repository::open(&self.root)?)
    }
}

impl GitProvider for LocalRepo {
    fn current_branch(&self) -> Result<String> {
        let repo = self.repository()?;
        let head = repo.head()?;

        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            let commit = head.peel_to_commit()?;
            tracing::debug!("detached HEAD, using short commit id as branch name");
            Ok(format!("{:.7}", commit.id()))
        }
    }

    fn head_info(&self) -> Result<GitInfo> {
        let repo = self.repository()?;
        let commit = repo.head()?.peel_to_commit()?;

        let timestamp: DateTime<Utc> = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        let author = commit.author();
        let author_name = author.name().unwrap_or("Unknown").to_string();

        // Diff HEAD against its first parent (empty tree for the root
        // commit) for the changed-file count and summary line.
        let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());
        let tree = commit.tree()?;
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let stats = diff.stats()?;

        Ok(GitInfo {
            branch: self.current_branch()?,
            commit: format!("{:.7}", commit.id()),
            author: author_name,
            timestamp,
            changed_files: stats.files_changed() as u32,
            diff_summary: format!(
                "{} files changed, {} insertions(+), {} deletions(-)",
                stats.files_changed(),
                stats.insertions(),
                stats.deletions()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::tempdir;

    fn init_repo_with_commit(path: &Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        repo.set_head("refs/heads/main").unwrap();

        std::fs::write(path.join("README.md"), "# test\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();

        {
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("Test Author", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial commit", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn open_fails_outside_a_repository() {
        let dir = tempdir().unwrap();
        assert!(LocalRepo::open(dir.path()).is_err());
    }

    #[test]
    fn current_branch_reports_checked_out_branch() {
        let dir = tempdir().unwrap();
        init_repo_with_commit(dir.path());

        let provider = LocalRepo::open(dir.path()).unwrap();
        assert_eq!(provider.current_branch().unwrap(), "main");
    }

    #[test]
    fn head_info_describes_the_head_commit() {
        let dir = tempdir().unwrap();
        init_repo_with_commit(dir.path());

        let provider = LocalRepo::open(dir.path()).unwrap();
        let info = provider.head_info().unwrap();

        assert_eq!(info.branch, "main");
        assert_eq!(info.commit.len(), 7);
        assert_eq!(info.author, "Test Author");
        assert_eq!(info.changed_files, 1);
        assert!(info.diff_summary.contains("1 files changed"));
    }
}
