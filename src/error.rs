//! Core error type and the coarse taxonomy reported alongside per-file
//! failures.
//!
//! Per-file failures are captured into command results and never abort a run;
//! invocation-level problems (bad root, unknown handler in a pack config)
//! surface as `Err` before any mutation happens.

use std::io;
use std::path::PathBuf;

/// Coarse classification used in reports and for exit-code decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    ExecutionFailed,
    Io,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ExecutionFailed => "execution failed",
            ErrorKind::Io => "io",
        }
    }
}

/// Errors produced by the deployment core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Dotfiles root missing or not a directory.
    #[error("invalid dotfiles root: {0}")]
    InvalidRoot(PathBuf),

    /// Pack directory name containing separators or reserved characters.
    #[error("invalid pack name: {0:?}")]
    InvalidPackName(String),

    /// A requested pack is not present under the dotfiles root.
    #[error("{}", unknown_pack_message(.name, .suggestion))]
    UnknownPack {
        name: String,
        suggestion: Option<String>,
    },

    /// A pack config references a handler that does not exist.
    #[error("unknown handler: {0:?}")]
    UnknownHandler(String),

    /// A pack config failed to parse.
    #[error("invalid pack config {path}: {message}")]
    BadConfig { path: PathBuf, message: String },

    /// A rule or ignore pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A rule carries an option the target handler does not recognise.
    #[error("unknown option {key:?} for {handler} handler")]
    UnknownOption { handler: &'static str, key: String },

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// A pack source expected by the datastore is absent.
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// The user path is occupied by a real file or directory the engine
    /// did not create; it is left untouched.
    #[error("user path occupied by a non-symlink: {0}")]
    UserPathOccupied(PathBuf),

    /// A provisioning subprocess exited non-zero; no sentinel was written.
    #[error("{}", execution_failed_message(.command, .exit_code, .stderr_tail))]
    ExecutionFailed {
        command: String,
        exit_code: i32,
        stderr_tail: String,
    },

    /// Underlying filesystem failure not otherwise classified.
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn unknown_pack_message(name: &str, suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("unknown pack: {name:?}. Did you mean: {s}?"),
        None => format!("unknown pack: {name:?}"),
    }
}

fn execution_failed_message(command: &str, exit_code: &i32, stderr_tail: &str) -> String {
    if stderr_tail.is_empty() {
        format!("command `{command}` failed with exit code {exit_code}")
    } else {
        format!("command `{command}` failed with exit code {exit_code}: {stderr_tail}")
    }
}

impl Error {
    /// Attach an operation name and path to a raw I/O failure.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRoot(_)
            | Error::InvalidPackName(_)
            | Error::UnknownPack { .. }
            | Error::UnknownHandler(_)
            | Error::BadConfig { .. }
            | Error::BadPattern { .. }
            | Error::UnknownOption { .. }
            | Error::NoHomeDir => ErrorKind::InvalidInput,
            Error::SourceNotFound(_) => ErrorKind::NotFound,
            Error::UserPathOccupied(_) => ErrorKind::Conflict,
            Error::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Error::Io { source, .. } => {
                if source.kind() == io::ErrorKind::NotFound {
                    ErrorKind::NotFound
                } else {
                    ErrorKind::Io
                }
            }
        }
    }
}
