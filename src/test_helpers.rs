//! Shared test helpers for setting up in-memory test environments.

use std::path::{Path, PathBuf};

use crate::handlers::Handler;
use crate::packs::Pack;
use crate::paths::Paths;
use crate::platform::FakeFs;
use crate::rules::RuleMatch;

pub const HOME: &str = "/home/test";
pub const DOTFILES: &str = "/home/test/dotfiles";
pub const DATA: &str = "/home/test/.local/share/dodot";

/// The standard resolver used across tests, matching [`setup_fs`].
pub fn test_paths() -> Paths {
    Paths::new(DOTFILES, HOME, format!("{HOME}/.config"), DATA)
}

/// Create a `FakeFs` seeded with an empty dotfiles root.
pub fn setup_fs() -> FakeFs {
    let fs = FakeFs::new(HOME);
    fs.add_dir(DOTFILES);
    fs
}

/// Run discovery and return the named pack, config included.
pub fn load_pack(fs: &FakeFs, name: &str) -> Pack {
    crate::packs::discover(&test_paths(), fs)
        .expect("discovery should succeed")
        .into_iter()
        .find(|p| p.name == name)
        .expect("pack should be discovered")
}

/// Build a rule match by hand for handler-level tests.
pub fn rule_match(pack: &str, rel: &str, handler: Handler) -> RuleMatch {
    RuleMatch {
        pack: pack.to_string(),
        rel: PathBuf::from(rel),
        abs: Path::new(DOTFILES).join(pack).join(rel),
        handler,
        options: toml::Table::new(),
        is_override: false,
    }
}
