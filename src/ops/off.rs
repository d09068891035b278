//! Remove deployed state for the selected packs.
//!
//! Three passes per pack: remove the user links derivable from the current
//! rule matches, remove every handler state directory, then sweep the user
//! trees for leftover symlinks still pointing into the pack's state dir
//! (sources deleted or renamed since deployment leave those behind). Only
//! symlinks whose target lies inside the state tree are ever touched, so a
//! user's own files and foreign symlinks survive. Idempotent throughout.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::datastore::DataStore;
use crate::error::Error;
use crate::handlers::{Handler, symlink};
use crate::ops::{is_store_symlink, select_packs};
use crate::packs;
use crate::paths::Paths;
use crate::platform::{Fs, WalkOptions};
use crate::report::{CommandResult, FileReport, Outcome, PackReport};
use crate::rules::{match_pack, rules_for_pack};

/// How deep the leftover sweep looks under home and the XDG config dir.
const SWEEP_DEPTH: usize = 6;

/// Options for the `off` command.
#[derive(Debug, Clone, Default)]
pub struct OffOptions {
    /// Packs to remove; empty means all.
    pub pack_names: Vec<String>,
    /// Report removals without performing them.
    pub dry_run: bool,
}

/// Remove all durable state for the selected packs, and every user symlink
/// that pointed into it.
pub fn run(paths: &Paths, opts: &OffOptions, fs: &impl Fs) -> Result<CommandResult, Error> {
    let packs = packs::discover(paths, fs)?;
    let selected = select_packs(packs, &opts.pack_names)?;
    let store = DataStore::new(paths, fs);
    let mut result = CommandResult::default();

    for pack in &selected {
        let mut report = PackReport::new(&pack.name);
        let state_dir = paths.pack_state_dir(&pack.name);
        let mut handled: HashSet<PathBuf> = HashSet::new();

        // User links derivable from the current matches.
        let rules = rules_for_pack(pack)?;
        let matches = match_pack(pack, &rules, fs)?;
        for m in matches.iter().filter(|m| m.handler == Handler::Symlink) {
            let user_path = symlink::user_target(paths, m);
            if !is_store_symlink(&user_path, &state_dir, fs) {
                continue;
            }
            handled.insert(user_path.clone());
            let outcome = remove_link(&user_path, opts.dry_run, fs);
            report.files.push(FileReport {
                handler: Handler::Symlink.name().to_string(),
                rel: m.rel.clone(),
                outcome,
            });
        }

        // Handler state directories, sentinels included.
        for handler in store.list_pack_handlers(&pack.name)? {
            let outcome = if opts.dry_run {
                Outcome::WouldDo(format!("remove {handler} state"))
            } else {
                match store.remove_state(&pack.name, &handler) {
                    Ok(()) => {
                        info!("Removed {handler} state for pack {}", pack.name);
                        Outcome::Done("removed state".to_string())
                    }
                    Err(e) => {
                        warn!("Removing {handler} state for {} failed: {e}", pack.name);
                        Outcome::failed(&e)
                    }
                }
            };
            report.files.push(FileReport {
                handler: handler.clone(),
                rel: PathBuf::from(&handler),
                outcome,
            });
        }

        // Drop the (now empty) pack state dir itself.
        if !opts.dry_run
            && let Err(e) = store.remove_pack_state(&pack.name)
        {
            warn!("Removing state dir for {} failed: {e}", pack.name);
        }

        // Sweep leftovers the matches no longer account for.
        for link in sweep_candidates(paths, &state_dir, fs)? {
            if handled.contains(&link) {
                continue;
            }
            let outcome = remove_link(&link, opts.dry_run, fs);
            report.files.push(FileReport {
                handler: Handler::Symlink.name().to_string(),
                rel: link,
                outcome,
            });
        }

        result.packs.push(report);
    }

    Ok(result)
}

fn remove_link(link: &Path, dry_run: bool, fs: &impl Fs) -> Outcome {
    if dry_run {
        return Outcome::WouldDo(format!("remove {}", link.display()));
    }
    match fs.remove_file(link) {
        Ok(()) => {
            info!("Removed {}", link.display());
            Outcome::Done(format!("removed {}", link.display()))
        }
        Err(e) => {
            let err = Error::io("remove", link, e);
            warn!("Removing {} failed: {err}", link.display());
            Outcome::failed(&err)
        }
    }
}

/// Symlinks under the user trees whose immediate target lies inside
/// `state_dir`. Walks home (and the XDG config dir when it lives outside
/// home), depth-capped, without following links.
fn sweep_candidates(
    paths: &Paths,
    state_dir: &Path,
    fs: &impl Fs,
) -> Result<Vec<PathBuf>, Error> {
    let mut roots = vec![paths.home.clone()];
    if !paths.xdg_config.starts_with(&paths.home) {
        roots.push(paths.xdg_config.clone());
    }

    let walk_opts = WalkOptions {
        min_depth: 1,
        max_depth: Some(SWEEP_DEPTH),
        follow_links: false,
    };
    let mut found = Vec::new();
    for root in roots {
        if !fs.is_dir(&root) {
            continue;
        }
        let entries = fs
            .walk_dir(&root, &walk_opts)
            .map_err(|e| Error::io("walk", &root, e))?;
        for entry in entries {
            if entry.is_symlink && is_store_symlink(&entry.path, state_dir, fs) {
                found.push(entry.path);
            }
        }
    }
    Ok(found)
}
