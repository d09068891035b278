//! Handler registry and contracts.
//!
//! Handlers are tagged variants behind two operations: `kind()` classifies
//! them as linking (idempotent, always re-run) or provisioning
//! (sentinel-gated, content-keyed), and `plan()` turns a rule match into an
//! ordered sequence of datastore calls. The dispatcher executes the calls;
//! handlers never touch the state tree themselves.

pub mod homebrew;
pub mod install;
pub mod path;
pub mod shell;
pub mod symlink;

use std::path::PathBuf;

use crate::error::Error;
use crate::paths::Paths;
use crate::platform::{Fs, RunCommand};
use crate::rules::RuleMatch;

/// Handler category, deciding execution semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Idempotent, cheap, always safe to re-run. State = intermediate links.
    Linking,
    /// Executes external commands; gated by a content-addressed sentinel.
    Provisioning,
}

/// The five concrete handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Handler {
    Install,
    Homebrew,
    Symlink,
    Path,
    Shell,
}

impl Handler {
    /// Execution order for deployment: provisioning handlers first, then
    /// linking handlers.
    pub const EXECUTION_ORDER: [Handler; 5] = [
        Handler::Install,
        Handler::Homebrew,
        Handler::Symlink,
        Handler::Path,
        Handler::Shell,
    ];

    pub fn from_name(name: &str) -> Option<Handler> {
        match name {
            "install" => Some(Handler::Install),
            "homebrew" => Some(Handler::Homebrew),
            "symlink" => Some(Handler::Symlink),
            "path" => Some(Handler::Path),
            "shell" => Some(Handler::Shell),
            _ => None,
        }
    }

    /// The handler's name, also its directory name in the state tree.
    pub fn name(self) -> &'static str {
        match self {
            Handler::Install => "install",
            Handler::Homebrew => "homebrew",
            Handler::Symlink => "symlink",
            Handler::Path => "path",
            Handler::Shell => "shell",
        }
    }

    pub fn kind(self) -> HandlerKind {
        match self {
            Handler::Install | Handler::Homebrew => HandlerKind::Provisioning,
            Handler::Symlink | Handler::Path | Handler::Shell => HandlerKind::Linking,
        }
    }

    /// Plan the datastore calls for one rule match.
    ///
    /// Planning is read-only: provisioning handlers read the source to
    /// compute its checksum, nothing else is touched. Two plans over the
    /// same matches and sources are identical.
    pub fn plan<F: Fs>(self, ctx: &PlanContext<'_, F>, m: &RuleMatch) -> Result<Vec<Effect>, Error> {
        match self {
            Handler::Install => install::plan(ctx, m),
            Handler::Homebrew => homebrew::plan(ctx, m),
            Handler::Symlink => symlink::plan(ctx, m),
            Handler::Path => path::plan(m),
            Handler::Shell => shell::plan(m),
        }
    }
}

impl std::fmt::Display for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only context handed to handler planning.
pub struct PlanContext<'a, F: Fs> {
    pub paths: &'a Paths,
    pub fs: &'a F,
}

/// One datastore call, in the order the dispatcher must perform them.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Create (or refresh) the intermediate symlink for a pack source.
    DataLink {
        pack: String,
        handler: Handler,
        source: PathBuf,
    },
    /// Create (or refresh) the user-visible symlink to the intermediate link.
    UserLink {
        pack: String,
        handler: Handler,
        source: PathBuf,
        user_path: PathBuf,
    },
    /// Run a command and record a sentinel on success; skipped when the
    /// sentinel is already present.
    Provision {
        pack: String,
        handler: Handler,
        source: PathBuf,
        sentinel: String,
        command: RunCommand,
    },
}

/// Reject option keys the handler does not recognise.
fn check_options(
    handler: &'static str,
    options: &toml::Table,
    allowed: &[&str],
) -> Result<(), Error> {
    for key in options.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(Error::UnknownOption {
                handler,
                key: key.clone(),
            });
        }
    }
    Ok(())
}

/// Basename of a source path as a string.
fn basename(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Everything of a provisioning sentinel name up to the checksum. The
/// status inspector uses this to spot sentinels from prior source versions.
pub(crate) fn sentinel_prefix(handler: Handler, pack: &str, source: &std::path::Path) -> String {
    match handler {
        Handler::Homebrew => format!("{pack}_{}-", basename(source)),
        _ => format!("{}-", basename(source)),
    }
}

/// Full sentinel name for a source at a given checksum.
pub(crate) fn sentinel_name(
    handler: Handler,
    pack: &str,
    source: &std::path::Path,
    checksum: &str,
) -> String {
    format!("{}{checksum}", sentinel_prefix(handler, pack, source))
}
