//! fslock-backed implementation of the state-tree lock.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::Locker;

/// Advisory lock over one data dir, backed by an OS file lock.
///
/// Opening creates the data dir first: on a fresh machine `on` takes the
/// lock before anything else has touched `<data>/`. fslock writes the
/// holder's PID into the file and releases the lock when this value drops.
pub struct RealLocker {
    file: fslock::LockFile,
    path: PathBuf,
}

impl RealLocker {
    /// Open (creating the data dir and lock file as needed) the lock at
    /// `path`. Does not take the lock yet.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(data_dir) = path.parent() {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;
        }
        let file = fslock::LockFile::open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;
        Ok(Self { file, path })
    }
}

impl Locker for RealLocker {
    fn try_lock(&mut self) -> Result<bool> {
        self.file
            .try_lock_with_pid()
            .with_context(|| format!("Failed to lock {}", self.path.display()))
    }

    fn owner_pid(&self) -> Option<u32> {
        // Best effort: the file may be empty or mid-write.
        let contents = std::fs::read_to_string(&self.path).ok()?;
        contents.trim().parse().ok()
    }

    fn lock_path(&self) -> &Path {
        &self.path
    }
}
