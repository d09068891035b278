//! Pure result structures returned by the commands.
//!
//! The core never prints; the CLI renders these. Per-file failures live
//! here rather than aborting a run, and the exit code derives from whether
//! any file failed.

use std::path::PathBuf;

use crate::error::{Error, ErrorKind};

/// Per-file deployment state as reconstructed by the status inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Everything in place and pointing where it should.
    Ready,
    /// No intermediate link / no sentinel yet.
    Missing,
    /// A sentinel exists, but for a prior checksum of the source.
    Changed,
    /// An intermediate or user link exists but points elsewhere.
    WrongTarget,
    /// The intermediate link is correct but its source is gone.
    SourceMissing,
    /// The user target is a real file the engine will not touch.
    UserPathOccupied,
}

impl FileState {
    pub fn label(self) -> &'static str {
        match self {
            FileState::Ready => "ready",
            FileState::Missing => "missing",
            FileState::Changed => "changed",
            FileState::WrongTarget => "wrong-target",
            FileState::SourceMissing => "source-missing",
            FileState::UserPathOccupied => "user-path-occupied",
        }
    }

    fn is_alert(self) -> bool {
        matches!(self, FileState::WrongTarget | FileState::UserPathOccupied)
    }
}

/// What happened (or would happen) to one file during a command.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A mutation was performed; the detail says what.
    Done(String),
    /// Nothing to do, with the reason (e.g. "sentinel present").
    Skipped(String),
    /// Dry run: the mutation that was withheld.
    WouldDo(String),
    /// Withheld because home symlinks are not enabled.
    Suppressed(String),
    /// Status inspection result.
    State(FileState),
    /// The per-file error, captured without aborting the run.
    Failed { kind: ErrorKind, message: String },
}

impl Outcome {
    pub fn failed(err: &Error) -> Self {
        Outcome::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// One-line rendering used by the CLI.
    pub fn summary(&self) -> String {
        match self {
            Outcome::Done(detail) => detail.clone(),
            Outcome::Skipped(reason) => format!("skipped ({reason})"),
            Outcome::WouldDo(detail) => format!("would {detail}"),
            Outcome::Suppressed(reason) => format!("suppressed ({reason})"),
            Outcome::State(state) => state.label().to_string(),
            Outcome::Failed { kind, message } => {
                format!("failed [{}]: {message}", kind.label())
            }
        }
    }
}

/// One file (or handler state entry) of one pack.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Handler name. A string rather than the registry enum so `off` can
    /// report stale state directories left by older versions.
    pub handler: String,
    /// Pack-relative path, or the handler directory name for state-level
    /// entries produced by `off`.
    pub rel: PathBuf,
    pub outcome: Outcome,
}

/// Rollup of a pack's file states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackHealth {
    Ready,
    Pending,
    Alert,
}

impl PackHealth {
    pub fn label(self) -> &'static str {
        match self {
            PackHealth::Ready => "ready",
            PackHealth::Pending => "pending",
            PackHealth::Alert => "alert",
        }
    }
}

/// All results for one pack.
#[derive(Debug, Clone)]
pub struct PackReport {
    pub name: String,
    pub files: Vec<FileReport>,
}

impl PackReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Any failure or corruption makes the pack `alert`; all-ready packs
    /// are `ready`; anything in between is `pending`.
    pub fn health(&self) -> PackHealth {
        let mut health = PackHealth::Ready;
        for file in &self.files {
            match &file.outcome {
                Outcome::Failed { .. } => return PackHealth::Alert,
                Outcome::State(state) if state.is_alert() => return PackHealth::Alert,
                Outcome::Done(_) | Outcome::Skipped(_) | Outcome::State(FileState::Ready) => {}
                _ => health = PackHealth::Pending,
            }
        }
        health
    }
}

/// Result of `on`, `off`, or `status` over the selected packs.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub packs: Vec<PackReport>,
}

impl CommandResult {
    /// 0 on full success, 1 when any file failed. Invocation errors never
    /// reach a `CommandResult`; they surface as `Err` and exit 2.
    pub fn exit_code(&self) -> i32 {
        let failed = self
            .packs
            .iter()
            .flat_map(|p| &p.files)
            .any(|f| f.outcome.is_failure());
        if failed { 1 } else { 0 }
    }
}
