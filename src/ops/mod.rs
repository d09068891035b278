//! Operations that implement dodot commands.
//!
//! Each submodule corresponds to a CLI subcommand and exposes a `run()`
//! function returning a [`crate::report::CommandResult`]. `on` deploys,
//! `off` reverses, `status` only inspects.

pub mod off;
pub mod on;
pub mod status;

use std::path::Path;
use strsim::jaro_winkler;

use crate::error::Error;
use crate::packs::Pack;
use crate::platform::Fs;

/// Check if `link` is a dodot-owned symlink: one whose immediate target
/// lies under `store_root`.
pub(crate) fn is_store_symlink(link: &Path, store_root: &Path, fs: &impl Fs) -> bool {
    if !fs.is_symlink(link) {
        return false;
    }
    match fs.read_link(link) {
        Ok(target) => target.starts_with(store_root),
        Err(_) => false,
    }
}

/// Filter discovered packs by the requested names. Empty means all.
///
/// An unknown name is an invocation error, with a fuzzy-matched suggestion
/// when one is close enough.
pub(crate) fn select_packs(packs: Vec<Pack>, names: &[String]) -> Result<Vec<Pack>, Error> {
    if names.is_empty() {
        return Ok(packs);
    }
    for name in names {
        if !packs.iter().any(|p| p.name == *name) {
            return Err(Error::UnknownPack {
                name: name.clone(),
                suggestion: suggest_pack(&packs, name),
            });
        }
    }
    Ok(packs
        .into_iter()
        .filter(|p| names.contains(&p.name))
        .collect())
}

/// Find the closest existing pack name for a given input.
///
/// Uses Jaro-Winkler similarity with a threshold of 0.8.
fn suggest_pack(packs: &[Pack], name: &str) -> Option<String> {
    const THRESHOLD: f64 = 0.8;
    let mut best: Option<(&str, f64)> = None;
    for pack in packs {
        let score = jaro_winkler(name, &pack.name);
        if score > THRESHOLD && (best.is_none() || score > best.unwrap().1) {
            best = Some((&pack.name, score));
        }
    }
    best.map(|(n, _)| n.to_string())
}
