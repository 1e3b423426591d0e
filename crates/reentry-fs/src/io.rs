//! Atomic I/O operations with file locking
//!
//! Writes go to a sibling `<path>.tmp` file under an exclusive advisory
//! lock and are renamed into place, so readers never observe a partial
//! file. The stage/promote/discard split exists so callers coordinating
//! writes to more than one file can stage everything before moving
//! anything.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::normalize::text_eq;
use crate::{Error, Result};

/// Compute the staging path for an atomic write: `<path>.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Write content to the staging file for `path` without touching `path`.
///
/// Ensures the parent directory exists, writes `<path>.tmp` under an
/// exclusive lock, and syncs it to disk. Returns the staging path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the staging
/// file cannot be written. The staging file is removed on failure.
pub fn stage(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let staged = temp_path(path);
    if let Err(e) = write_locked(&staged, content) {
        let _ = fs::remove_file(&staged);
        return Err(e);
    }
    Ok(staged)
}

/// Move the staging file for `path` into place.
///
/// # Errors
///
/// Returns an error if the rename fails; the staging file is left for
/// the caller to [`discard`].
pub fn promote(path: &Path) -> Result<()> {
    fs::rename(temp_path(path), path).map_err(|e| Error::io(path, e))
}

/// Remove the staging file for `path`, if any. Best effort.
pub fn discard(path: &Path) {
    let _ = fs::remove_file(temp_path(path));
}

/// Write content atomically to a file.
///
/// # Errors
///
/// Returns an error if staging or the final rename fails. The staging
/// file is removed on any failure path.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    stage(path, content)?;
    promote(path).inspect_err(|_| discard(path))
}

/// Write content atomically only if it differs from what is on disk.
///
/// The comparison is EOL/trailing-newline-insensitive, so rewrites that
/// would only churn line endings are skipped. Returns whether a write
/// happened.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Some(existing) = read_text_if_exists(path)?
        && text_eq(&existing, content)
    {
        tracing::debug!(path = %path.display(), "content unchanged, skipping write");
        return Ok(false);
    }
    write_atomic(path, content)?;
    Ok(true)
}

/// Read a file's text content, or `None` if it does not exist.
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn write_locked(staged: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(staged)
        .map_err(|e| Error::io(staged, e))?;

    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: staged.to_path_buf(),
    })?;

    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(staged, e))?;
    file.sync_all().map_err(|e| Error::io(staged, e))?;

    file.unlock().map_err(|_| Error::LockFailed {
        path: staged.to_path_buf(),
    })?;

    Ok(())
}
