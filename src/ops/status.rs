//! Read-only reconstruction of deployment state.
//!
//! Walks rules and the state tree without executing anything: for linking
//! handlers the intermediate (and user) links are checked against their
//! expected targets; for provisioning handlers the current checksum decides
//! between a valid sentinel, a stale one, and none at all.

use crate::checksum::sha256_file;
use crate::datastore::DataStore;
use crate::error::Error;
use crate::handlers::{Handler, HandlerKind, sentinel_name, sentinel_prefix, symlink};
use crate::ops::select_packs;
use crate::packs;
use crate::paths::Paths;
use crate::platform::Fs;
use crate::report::{CommandResult, FileReport, FileState, Outcome, PackReport};
use crate::rules::{RuleMatch, match_pack, rules_for_pack};

/// Options for the `status` command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Packs to inspect; empty means all.
    pub pack_names: Vec<String>,
}

/// Inspect the selected packs. Performs no writes and runs no subprocess.
pub fn run(paths: &Paths, opts: &StatusOptions, fs: &impl Fs) -> Result<CommandResult, Error> {
    let packs = packs::discover(paths, fs)?;
    let selected = select_packs(packs, &opts.pack_names)?;
    let store = DataStore::new(paths, fs);
    let mut result = CommandResult::default();

    for pack in &selected {
        let mut report = PackReport::new(&pack.name);
        let rules = rules_for_pack(pack)?;
        for m in match_pack(pack, &rules, fs)? {
            let state = match m.handler.kind() {
                HandlerKind::Linking => inspect_linking(paths, fs, &m),
                HandlerKind::Provisioning => inspect_provisioning(&store, fs, &m),
            };
            report.files.push(FileReport {
                handler: m.handler.name().to_string(),
                rel: m.rel.clone(),
                outcome: Outcome::State(state),
            });
        }
        result.packs.push(report);
    }

    Ok(result)
}

/// Check the intermediate link, its source, and (for the symlink handler)
/// the user link.
fn inspect_linking(paths: &Paths, fs: &impl Fs, m: &RuleMatch) -> FileState {
    let intermediate = paths.intermediate_path(&m.pack, m.handler.name(), &m.abs);

    if !fs.is_symlink(&intermediate) {
        // A non-symlink entry where a link belongs is corruption.
        if fs.exists(&intermediate) {
            return FileState::WrongTarget;
        }
        return FileState::Missing;
    }
    if !fs.read_link(&intermediate).is_ok_and(|t| t == m.abs) {
        return FileState::WrongTarget;
    }
    if !fs.exists(&m.abs) {
        return FileState::SourceMissing;
    }

    if m.handler != Handler::Symlink {
        return FileState::Ready;
    }

    let user_path = symlink::user_target(paths, m);
    if fs.is_symlink(&user_path) {
        if fs.read_link(&user_path).is_ok_and(|t| t == intermediate) {
            FileState::Ready
        } else {
            FileState::WrongTarget
        }
    } else if fs.exists(&user_path) {
        FileState::UserPathOccupied
    } else {
        FileState::Missing
    }
}

/// Derive the expected sentinel from the current source content and look
/// for it, or for stale siblings from prior versions.
fn inspect_provisioning<F: Fs>(store: &DataStore<'_, F>, fs: &F, m: &RuleMatch) -> FileState {
    let Ok(checksum) = sha256_file(fs, &m.abs) else {
        return FileState::SourceMissing;
    };
    let expected = sentinel_name(m.handler, &m.pack, &m.abs, &checksum);
    if store.has_sentinel(&m.pack, m.handler, &expected) {
        return FileState::Ready;
    }

    let prefix = sentinel_prefix(m.handler, &m.pack, &m.abs);
    let stale = store
        .list_handler_sentinels(&m.pack, m.handler.name())
        .unwrap_or_default()
        .iter()
        .any(|s| s.starts_with(&prefix));
    if stale {
        FileState::Changed
    } else {
        FileState::Missing
    }
}
