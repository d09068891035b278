//! Well-known path computation: pack directories, the state tree, and the
//! mapping from pack-relative files to user-visible targets.
//!
//! Everything here is pure and deterministic — no method touches the
//! filesystem. Inputs are validated by the callers (discovery checks the
//! root, the CLI resolves the home directory before constructing [`Paths`]).

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::platform::Fs;

/// Environment override relocating the state tree (used by tests and CI).
pub const DATA_DIR_ENV: &str = "DODOT_DATA_DIR";

/// The resolver: all well-known paths derive from these four roots.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Directory whose direct children are packs.
    pub dotfiles_root: PathBuf,
    /// The user's home directory.
    pub home: PathBuf,
    /// XDG config directory (usually `~/.config`).
    pub xdg_config: PathBuf,
    /// Root of the durable state tree (usually `~/.local/share/dodot`).
    pub data_dir: PathBuf,
}

impl Paths {
    pub fn new(
        dotfiles_root: impl Into<PathBuf>,
        home: impl Into<PathBuf>,
        xdg_config: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dotfiles_root: dotfiles_root.into(),
            home: home.into(),
            xdg_config: xdg_config.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the roots from the environment: home and XDG dirs from the
    /// filesystem adapter, the data dir from (in order) the explicit
    /// override, `DODOT_DATA_DIR`, or `<data home>/dodot`.
    pub fn from_env(
        dotfiles_root: PathBuf,
        data_override: Option<PathBuf>,
        fs: &impl Fs,
    ) -> Result<Self, Error> {
        let home = fs.home_dir().ok_or(Error::NoHomeDir)?;
        let xdg_config = fs.config_dir().unwrap_or_else(|| home.join(".config"));
        let data_dir = data_override
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .or_else(|| fs.data_dir().map(|d| d.join("dodot")))
            .unwrap_or_else(|| home.join(".local/share/dodot"));
        Ok(Self::new(dotfiles_root, home, xdg_config, data_dir))
    }

    /// `<dotfiles root>/<pack>`
    pub fn pack_path(&self, pack: &str) -> PathBuf {
        self.dotfiles_root.join(pack)
    }

    /// `<data dir>/packs` — every durable effect lives under here.
    pub fn packs_root(&self) -> PathBuf {
        self.data_dir.join("packs")
    }

    /// `<data dir>/packs/<pack>`
    pub fn pack_state_dir(&self, pack: &str) -> PathBuf {
        self.packs_root().join(pack)
    }

    /// `<data dir>/packs/<pack>/<handler>`
    pub fn pack_handler_dir(&self, pack: &str, handler: &str) -> PathBuf {
        self.pack_state_dir(pack).join(handler)
    }

    /// The intermediate-link path for a source file: the handler state dir
    /// plus the source basename.
    pub fn intermediate_path(&self, pack: &str, handler: &str, source: &Path) -> PathBuf {
        let mut path = self.pack_handler_dir(pack, handler);
        if let Some(name) = source.file_name() {
            path.push(name);
        }
        path
    }

    /// Lock file guarding mutating commands.
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("dodot.lock")
    }

    /// Map a pack-relative path to its user-visible target.
    ///
    /// `.config/...` routes to the XDG config dir; everything else lands
    /// under home with a `.` prepended to the first component when not
    /// already present.
    pub fn map_pack_file_to_system(&self, rel: &Path) -> PathBuf {
        if let Ok(rest) = rel.strip_prefix(".config") {
            return self.xdg_config.join(rest);
        }
        let mut components = rel.components();
        let Some(first) = components.next() else {
            return self.home.clone();
        };
        let first = first.as_os_str().to_string_lossy();
        let dotted = if first.starts_with('.') {
            first.into_owned()
        } else {
            format!(".{first}")
        };
        let mut target = self.home.join(dotted);
        let rest = components.as_path();
        if !rest.as_os_str().is_empty() {
            target.push(rest);
        }
        target
    }

    /// Expand `~` or `~/...` at the start of a path to the home directory.
    ///
    /// Returns the path unchanged if it doesn't start with `~`.
    pub fn expand_tilde(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            self.home.join(rest)
        } else if path == "~" {
            self.home.clone()
        } else {
            PathBuf::from(path)
        }
    }
}
