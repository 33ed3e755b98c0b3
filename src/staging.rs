use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Scratch directory that is either promoted to its final path or deleted.
///
/// Dropping the guard without calling [`StagingDir::promote`] removes the
/// directory, so an error or cancellation mid-event leaves nothing behind.
/// Promotion is a single `rename`, which is only atomic when the staging and
/// final paths share a filesystem.
pub struct StagingDir {
    path: PathBuf,
    armed: bool,
}

impl StagingDir {
    /// Create a fresh staging directory, discarding leftovers from a crashed run.
    pub fn acquire(path: PathBuf) -> Result<Self> {
        if path.exists() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to clear stale staging dir {}", path.display()))?;
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create staging dir {}", path.display()))?;
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(fs::read_dir(&self.path)?.next().is_none())
    }

    /// Rename onto `dest` if anything was staged; otherwise delete.
    /// Returns whether `dest` was created.
    pub fn promote(mut self, dest: &Path) -> Result<bool> {
        if self.is_empty()? {
            return Ok(false); // dropped below
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&self.path, dest).with_context(|| {
            format!("Failed to move {} to {}", self.path.display(), dest.display())
        })?;
        self.armed = false;
        Ok(true)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}
