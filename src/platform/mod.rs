//! Abstracted external dependencies for testability.
//!
//! Three traits cover all side effects: [`Fs`] for filesystem operations,
//! [`Runner`] for subprocess execution, and [`Locker`] for the process lock.
//!
//! Production code uses the real implementations ([`RealFs`], [`RealRunner`],
//! [`RealLocker`]). Tests substitute fakes via generics — no trait objects
//! needed. Every `Fs` operation takes an absolute path and returns
//! `std::io::Result`, so callers can tell not-found apart from other I/O
//! failures via [`std::io::ErrorKind`].

mod real_fs;
mod real_locker;
mod real_runner;

pub use real_fs::RealFs;
pub use real_locker::RealLocker;
pub use real_runner::RealRunner;

#[cfg(test)]
mod fake_fs;
#[cfg(test)]
mod fake_locker;
#[cfg(test)]
mod fake_runner;

#[cfg(test)]
#[allow(unused_imports)]
pub use self::fake_fs::FakeFs;
#[cfg(test)]
#[allow(unused_imports)]
pub use self::fake_locker::FakeLocker;
#[cfg(test)]
#[allow(unused_imports)]
pub use self::fake_runner::FakeRunner;

use std::io;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Options for directory traversal via [`Fs::walk_dir`].
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Maximum depth to recurse. `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Minimum depth before yielding entries (0 = include the root itself).
    pub min_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_links: bool,
}

/// A single entry returned by [`Fs::read_dir`] or [`Fs::walk_dir`].
///
/// Type flags are raw (lstat-style): a symlink to a directory reports
/// `is_symlink` true and `is_dir` false.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Full path to this entry.
    pub path: PathBuf,
    /// Whether this is a regular file.
    pub is_file: bool,
    /// Whether this is a directory.
    pub is_dir: bool,
    /// Whether the path itself is a symbolic link.
    pub is_symlink: bool,
}

impl DirEntry {
    /// Basename of the entry as a string (lossy for non-UTF-8 names).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Abstraction over all filesystem operations, directory traversal, and
/// system path queries (home dir, config dir, data dir).
///
/// Every method that touches the filesystem goes through this trait.
pub trait Fs {
    // -- Reading --

    /// Read the entire contents of a file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read the entire contents of a file as a UTF-8 string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    // -- Writing --

    /// Write `contents` to a file, creating it or truncating if it exists.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    // -- Removal --

    /// Remove a single file (or symlink, without following it).
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Recursively remove a directory and everything under it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Atomically rename `from` to `to`, replacing `to` if present.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    // -- Directory creation --

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    // -- Symlinks --

    /// Create a symbolic link at `link` pointing to `original`.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Read the target of a symbolic link.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    // -- Path queries --

    /// Check if a path exists (follows symlinks; broken symlinks return false).
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a symbolic link (raw lstat, does not follow).
    fn is_symlink(&self, path: &Path) -> bool;

    /// Check if a path is a regular file (follows symlinks).
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory (follows symlinks).
    fn is_dir(&self, path: &Path) -> bool;

    // -- Directory traversal --

    /// List the immediate children of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Walk a directory tree, returning entries matching the given options.
    fn walk_dir(&self, path: &Path, opts: &WalkOptions) -> io::Result<Vec<DirEntry>>;

    // -- System paths --

    /// Return the user's home directory, if it can be determined.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Return the user's config directory (e.g. `~/.config`), if it can be determined.
    fn config_dir(&self) -> Option<PathBuf>;

    /// Return the user's data directory (e.g. `~/.local/share`), if it can be determined.
    fn data_dir(&self) -> Option<PathBuf>;
}

// ---------------------------------------------------------------------------
// Subprocess runner
// ---------------------------------------------------------------------------

/// A command to be executed by a [`Runner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCommand {
    /// Program to invoke (absolute path or name resolved via `PATH`).
    pub program: String,
    /// Arguments, not including the program itself.
    pub args: Vec<String>,
}

impl RunCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl std::fmt::Display for RunCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code; -1 when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over subprocess execution.
///
/// In production, spawns the command and waits for it with captured output.
/// In tests, returns scripted results and records invocations.
pub trait Runner {
    /// Run the command to completion, inheriting the current environment.
    ///
    /// An `Err` means the process could not be spawned; a non-zero exit is
    /// reported through [`RunOutput::exit_code`], not as an error.
    fn run(&self, command: &RunCommand) -> io::Result<RunOutput>;
}

// ---------------------------------------------------------------------------
// State-tree lock
// ---------------------------------------------------------------------------

/// Abstraction over the advisory lock serialising mutations of one state
/// tree.
///
/// The lock file lives inside the data dir and records the holder's PID so
/// contention errors can name the other process. There is no explicit
/// release: the lock is held for the rest of the command and freed when the
/// value drops.
pub trait Locker {
    /// Try to take the lock without blocking; `false` when another process
    /// holds it.
    fn try_lock(&mut self) -> anyhow::Result<bool>;

    /// PID recorded by the current holder, when one can be read.
    fn owner_pid(&self) -> Option<u32>;

    /// Path to the lock file.
    fn lock_path(&self) -> &Path;
}
