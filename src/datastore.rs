//! The durable state layer.
//!
//! Every mutation of `<data>/packs/` goes through this type; nothing else in
//! the crate writes into the state tree. For linking handlers the state is
//! one intermediate symlink per source; for provisioning handlers it is a
//! sentinel file whose name embeds the source checksum and whose body
//! records completion time. Link replacement goes through a temp link plus
//! rename, so an observer sees either the old entry or the new one.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;
use crate::handlers::Handler;
use crate::paths::Paths;
use crate::platform::{Fs, RunCommand, RunOutput, Runner};

/// What a link call actually did, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Created,
    Replaced,
    Unchanged,
}

/// Handle over the state tree. Cheap to construct per command.
pub struct DataStore<'a, F: Fs> {
    paths: &'a Paths,
    fs: &'a F,
}

impl<'a, F: Fs> DataStore<'a, F> {
    pub fn new(paths: &'a Paths, fs: &'a F) -> Self {
        Self { paths, fs }
    }

    /// Ensure `<data>/packs/<pack>/<handler>/<basename>` is a symlink to
    /// `source`. No-op when already correct; any other entry at that path
    /// is replaced, whatever it is.
    pub fn create_data_link(
        &self,
        pack: &str,
        handler: Handler,
        source: &Path,
    ) -> Result<(PathBuf, LinkChange), Error> {
        if !self.fs.exists(source) {
            return Err(Error::SourceNotFound(source.to_path_buf()));
        }

        let dir = self.paths.pack_handler_dir(pack, handler.name());
        self.fs
            .create_dir_all(&dir)
            .map_err(|e| Error::io("create dir", &dir, e))?;

        let link = self.paths.intermediate_path(pack, handler.name(), source);
        if self.fs.is_symlink(&link) {
            if self.fs.read_link(&link).is_ok_and(|t| t == source) {
                return Ok((link, LinkChange::Unchanged));
            }
        } else if self.fs.is_dir(&link) {
            // A directory can't be renamed over; clear it first.
            self.fs
                .remove_dir_all(&link)
                .map_err(|e| Error::io("remove", &link, e))?;
        }

        let change = if self.fs.is_symlink(&link) || self.fs.exists(&link) {
            LinkChange::Replaced
        } else {
            LinkChange::Created
        };
        self.replace_symlink(source, &link)?;
        debug!("Linked {} -> {}", link.display(), source.display());
        Ok((link, change))
    }

    /// Ensure `user_path` is a symlink to `intermediate`.
    ///
    /// A symlink pointing elsewhere is replaced — the engine is
    /// authoritative for paths the user has delegated. A real file or
    /// directory is never touched; that is `UserPathOccupied`.
    pub fn create_user_link(
        &self,
        intermediate: &Path,
        user_path: &Path,
    ) -> Result<LinkChange, Error> {
        if let Some(parent) = user_path.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| Error::io("create dir", parent, e))?;
        }

        if self.fs.is_symlink(user_path) {
            if self.fs.read_link(user_path).is_ok_and(|t| t == intermediate) {
                return Ok(LinkChange::Unchanged);
            }
            self.replace_symlink(intermediate, user_path)?;
            return Ok(LinkChange::Replaced);
        }
        if self.fs.exists(user_path) {
            return Err(Error::UserPathOccupied(user_path.to_path_buf()));
        }

        self.replace_symlink(intermediate, user_path)?;
        debug!(
            "Linked {} -> {}",
            user_path.display(),
            intermediate.display()
        );
        Ok(LinkChange::Created)
    }

    /// Execute `command`; on exit 0, write the sentinel recording when.
    ///
    /// A non-zero exit writes nothing and surfaces the captured stderr
    /// tail; on success the captured output is logged and returned.
    pub fn run_and_record(
        &self,
        runner: &impl Runner,
        pack: &str,
        handler: Handler,
        command: &RunCommand,
        sentinel: &str,
    ) -> Result<RunOutput, Error> {
        debug!("Running `{command}` for pack {pack}");
        let output = runner
            .run(command)
            .map_err(|e| Error::io("spawn", PathBuf::from(&command.program), e))?;

        if !output.success() {
            return Err(Error::ExecutionFailed {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr_tail: stderr_tail(&output.stderr),
            });
        }
        if !output.stdout.trim().is_empty() {
            debug!("`{command}` stdout: {}", output.stdout.trim());
        }
        if !output.stderr.trim().is_empty() {
            debug!("`{command}` stderr: {}", output.stderr.trim());
        }

        let dir = self.paths.pack_handler_dir(pack, handler.name());
        self.fs
            .create_dir_all(&dir)
            .map_err(|e| Error::io("create dir", &dir, e))?;
        let sentinel_path = dir.join(sentinel);
        let body = format!("completed|{}", Utc::now().to_rfc3339());
        self.fs
            .write(&sentinel_path, body.as_bytes())
            .map_err(|e| Error::io("write", &sentinel_path, e))?;
        Ok(output)
    }

    /// Whether a sentinel file exists for this (pack, handler, name).
    pub fn has_sentinel(&self, pack: &str, handler: Handler, sentinel: &str) -> bool {
        self.fs
            .exists(&self.paths.pack_handler_dir(pack, handler.name()).join(sentinel))
    }

    /// Handler directories currently present for a pack. Empty when the
    /// pack has no state.
    pub fn list_pack_handlers(&self, pack: &str) -> Result<Vec<String>, Error> {
        let dir = self.paths.pack_state_dir(pack);
        if !self.fs.is_dir(&dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .read_dir(&dir)
            .map_err(|e| Error::io("read dir", &dir, e))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.file_name())
            .collect())
    }

    /// Sentinel files currently present for a (pack, handler). Empty when
    /// the directory is absent. Intermediate links are not sentinels and
    /// are filtered out.
    pub fn list_handler_sentinels(&self, pack: &str, handler: &str) -> Result<Vec<String>, Error> {
        let dir = self.paths.pack_handler_dir(pack, handler);
        if !self.fs.is_dir(&dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .read_dir(&dir)
            .map_err(|e| Error::io("read dir", &dir, e))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_file)
            .map(|e| e.file_name())
            .collect())
    }

    /// Recursively remove one handler's state for a pack. Idempotent.
    pub fn remove_state(&self, pack: &str, handler: &str) -> Result<(), Error> {
        self.remove_tree(self.paths.pack_handler_dir(pack, handler))
    }

    /// Recursively remove all state for a pack. Idempotent.
    pub fn remove_pack_state(&self, pack: &str) -> Result<(), Error> {
        self.remove_tree(self.paths.pack_state_dir(pack))
    }

    fn remove_tree(&self, dir: PathBuf) -> Result<(), Error> {
        if !self.fs.is_dir(&dir) {
            return Ok(());
        }
        self.fs
            .remove_dir_all(&dir)
            .map_err(|e| Error::io("remove", &dir, e))
    }

    /// Swap `link` to point at `target` via a temp link plus rename.
    fn replace_symlink(&self, target: &Path, link: &Path) -> Result<(), Error> {
        let temp = temp_link_path(link);
        if self.fs.is_symlink(&temp) || self.fs.exists(&temp) {
            self.fs
                .remove_file(&temp)
                .map_err(|e| Error::io("remove", &temp, e))?;
        }
        self.fs
            .symlink(target, &temp)
            .map_err(|e| Error::io("symlink", &temp, e))?;
        if let Err(e) = self.fs.rename(&temp, link) {
            let _ = self.fs.remove_file(&temp);
            return Err(Error::io("rename", link, e));
        }
        Ok(())
    }
}

fn temp_link_path(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    link.with_file_name(format!("{name}.dodot-tmp"))
}

fn stderr_tail(stderr: &str) -> String {
    const TAIL_LINES: usize = 10;
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}
