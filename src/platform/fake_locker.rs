//! In-memory stand-in for the state-tree lock.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::Locker;

/// Scripted lock: either free (acquisition succeeds and is recorded) or
/// permanently held by a pretend PID, for driving the contention path.
pub struct FakeLocker {
    path: PathBuf,
    holder: Option<u32>,
    taken: bool,
}

impl FakeLocker {
    /// A lock nobody holds.
    pub fn free(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            holder: None,
            taken: false,
        }
    }

    /// A lock some other process (with `pid`) never lets go of.
    pub fn held_by(pid: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            holder: Some(pid),
            taken: false,
        }
    }

    /// Whether this fake handed the lock out.
    pub fn is_taken(&self) -> bool {
        self.taken
    }
}

impl Locker for FakeLocker {
    fn try_lock(&mut self) -> Result<bool> {
        if self.holder.is_some() {
            return Ok(false);
        }
        self.taken = true;
        Ok(true)
    }

    fn owner_pid(&self) -> Option<u32> {
        self.holder
    }

    fn lock_path(&self) -> &Path {
        &self.path
    }
}
