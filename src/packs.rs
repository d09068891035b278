//! Pack discovery: enumerating pack candidates under the dotfiles root.
//!
//! A pack is a direct child directory of the root whose name does not start
//! with `.`, which carries no top-level `.dodotignore`, and whose config does
//! not set `skip = true`. Discovery is re-done on every command; packs have
//! no persistent identity.

use std::path::PathBuf;
use tracing::warn;

use crate::config::{PACK_CONFIG_FILE, PACK_IGNORE_FILE, PackConfig};
use crate::error::Error;
use crate::paths::Paths;
use crate::platform::Fs;

/// A discovered pack. Identity is the name; the config rides along so rule
/// building never re-reads it.
#[derive(Debug, Clone)]
pub struct Pack {
    pub name: String,
    pub path: PathBuf,
    pub config: PackConfig,
}

/// Reject names that could escape the dotfiles root or collide with the
/// state tree layout.
pub fn validate_pack_name(name: &str) -> Result<(), Error> {
    let reserved = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if reserved {
        return Err(Error::InvalidPackName(name.to_string()));
    }
    Ok(())
}

/// Enumerate packs under the dotfiles root, sorted lexicographically by name.
///
/// Fails fast with `InvalidRoot` when the root is missing or not a
/// directory. A pack whose config fails to parse is skipped with a warning;
/// the rest of the run proceeds.
pub fn discover(paths: &Paths, fs: &impl Fs) -> Result<Vec<Pack>, Error> {
    let root = &paths.dotfiles_root;
    if !fs.is_dir(root) {
        return Err(Error::InvalidRoot(root.clone()));
    }

    let mut packs = Vec::new();
    for entry in fs
        .read_dir(root)
        .map_err(|e| Error::io("read dir", root.clone(), e))?
    {
        if !entry.is_dir {
            continue;
        }
        let name = entry.file_name();
        if name.starts_with('.') {
            continue;
        }
        validate_pack_name(&name)?;
        let path = paths.pack_path(&name);

        if fs.exists(&path.join(PACK_IGNORE_FILE)) {
            continue;
        }

        let config_path = path.join(PACK_CONFIG_FILE);
        let config = if fs.exists(&config_path) {
            match PackConfig::load(&config_path, fs) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Skipping pack {name}: {e}");
                    continue;
                }
            }
        } else {
            PackConfig::default()
        };
        if config.skip {
            continue;
        }

        packs.push(Pack { name, path, config });
    }

    // read_dir returns sorted entries, so packs arrive in name order.
    Ok(packs)
}
