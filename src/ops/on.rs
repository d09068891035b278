//! Deploy packs: match files to handlers and materialise their effects.
//!
//! Handlers execute in a fixed order (provisioning first, install before
//! homebrew), and within a handler matches run in lexicographic order of
//! pack then pack-relative path. Per-file failures are captured into the
//! result and the run continues; only invocation-level problems (bad root,
//! unknown pack, unknown handler in a pack config) abort, and they do so
//! before any mutation.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::datastore::{DataStore, LinkChange};
use crate::error::Error;
use crate::handlers::{Effect, Handler, PlanContext};
use crate::ops::select_packs;
use crate::packs;
use crate::paths::Paths;
use crate::platform::{Fs, Runner};
use crate::report::{CommandResult, FileReport, Outcome, PackReport};
use crate::rules::{RuleMatch, match_pack, rules_for_pack};

/// Options for the `on` command.
#[derive(Debug, Clone, Default)]
pub struct OnOptions {
    /// Packs to deploy; empty means all.
    pub pack_names: Vec<String>,
    /// Report mutations without performing them.
    pub dry_run: bool,
    /// Re-run provisioning handlers even when their sentinel is present.
    pub force: bool,
    /// Allow user-link writes under the home directory. Off by default so
    /// nothing touches a real home without an explicit opt-in.
    pub enable_home_symlinks: bool,
}

/// Deploy the selected packs.
pub fn run(
    paths: &Paths,
    opts: &OnOptions,
    fs: &impl Fs,
    runner: &impl Runner,
) -> Result<CommandResult, Error> {
    let packs = packs::discover(paths, fs)?;
    let selected = select_packs(packs, &opts.pack_names)?;

    // Match everything up front: rule problems abort before any mutation.
    let mut reports: BTreeMap<String, PackReport> = BTreeMap::new();
    let mut by_handler: BTreeMap<Handler, Vec<RuleMatch>> = BTreeMap::new();
    for pack in &selected {
        reports.insert(pack.name.clone(), PackReport::new(&pack.name));
        let rules = rules_for_pack(pack)?;
        for m in match_pack(pack, &rules, fs)? {
            by_handler.entry(m.handler).or_default().push(m);
        }
    }

    let store = DataStore::new(paths, fs);
    let ctx = PlanContext { paths, fs };

    for handler in Handler::EXECUTION_ORDER {
        let Some(mut matches) = by_handler.remove(&handler) else {
            continue;
        };
        matches.sort_by(|a, b| (&a.pack, &a.rel).cmp(&(&b.pack, &b.rel)));

        for m in &matches {
            if m.is_override {
                debug!("{}/{} matched an override rule", m.pack, m.rel.display());
            }
            let outcome = deploy_match(handler, &ctx, &store, runner, m, opts);
            match &outcome {
                Outcome::Skipped(_) => {
                    debug!("{handler} {}/{}: {}", m.pack, m.rel.display(), outcome.summary());
                }
                _ => {
                    info!("{handler} {}/{}: {}", m.pack, m.rel.display(), outcome.summary());
                }
            }
            if let Some(report) = reports.get_mut(&m.pack) {
                report.files.push(FileReport {
                    handler: handler.name().to_string(),
                    rel: m.rel.clone(),
                    outcome,
                });
            }
        }
    }

    Ok(CommandResult {
        packs: reports.into_values().collect(),
    })
}

/// Plan and execute one match, folding its effects into a single outcome.
///
/// Stops at the first failed effect: a user link over a missing
/// intermediate would only compound the damage.
fn deploy_match<F: Fs, R: Runner>(
    handler: Handler,
    ctx: &PlanContext<'_, F>,
    store: &DataStore<'_, F>,
    runner: &R,
    m: &RuleMatch,
    opts: &OnOptions,
) -> Outcome {
    let effects = match handler.plan(ctx, m) {
        Ok(effects) => effects,
        Err(e) => {
            warn!("Planning {}/{} failed: {e}", m.pack, m.rel.display());
            return Outcome::failed(&e);
        }
    };

    let mut outcome: Option<Outcome> = None;
    for effect in &effects {
        let next = match apply_effect(ctx, store, runner, effect, opts) {
            Ok(next) => next,
            Err(e) => {
                warn!("{handler} {}/{} failed: {e}", m.pack, m.rel.display());
                Outcome::failed(&e)
            }
        };
        let failed = next.is_failure();
        outcome = Some(match outcome {
            None => next,
            Some(prev) => prefer(prev, next),
        });
        if failed {
            break;
        }
    }
    outcome.unwrap_or_else(|| Outcome::Skipped("nothing to do".to_string()))
}

/// Execute a single datastore call, honouring dry-run, force, and the
/// home-write capability.
fn apply_effect<F: Fs, R: Runner>(
    ctx: &PlanContext<'_, F>,
    store: &DataStore<'_, F>,
    runner: &R,
    effect: &Effect,
    opts: &OnOptions,
) -> Result<Outcome, Error> {
    match effect {
        Effect::DataLink {
            pack,
            handler,
            source,
        } => {
            if opts.dry_run {
                return Ok(Outcome::WouldDo(format!(
                    "link {} into the state dir",
                    source.display()
                )));
            }
            let (_, change) = store.create_data_link(pack, *handler, source)?;
            Ok(link_outcome(change, "state link"))
        }

        Effect::UserLink {
            pack,
            handler,
            source,
            user_path,
        } => {
            if user_path.starts_with(&ctx.paths.home) && !opts.enable_home_symlinks {
                return Ok(Outcome::Suppressed("home symlinks disabled".to_string()));
            }
            let intermediate = ctx.paths.intermediate_path(pack, handler.name(), source);
            if opts.dry_run {
                // Still surface conflicts the real run would hit.
                if ctx.fs.exists(user_path) && !ctx.fs.is_symlink(user_path) {
                    return Err(Error::UserPathOccupied(user_path.clone()));
                }
                return Ok(Outcome::WouldDo(format!(
                    "link {} -> {}",
                    user_path.display(),
                    intermediate.display()
                )));
            }
            let change = store.create_user_link(&intermediate, user_path)?;
            Ok(link_outcome(change, "user link"))
        }

        Effect::Provision {
            pack,
            handler,
            sentinel,
            command,
            ..
        } => {
            if !opts.force && store.has_sentinel(pack, *handler, sentinel) {
                return Ok(Outcome::Skipped("sentinel present".to_string()));
            }
            if opts.dry_run {
                return Ok(Outcome::WouldDo(format!("run `{command}`")));
            }
            store.run_and_record(runner, pack, *handler, command, sentinel)?;
            Ok(Outcome::Done(format!("ran `{command}`")))
        }
    }
}

fn link_outcome(change: LinkChange, what: &str) -> Outcome {
    match change {
        LinkChange::Created => Outcome::Done(format!("created {what}")),
        LinkChange::Replaced => Outcome::Done(format!("replaced {what}")),
        LinkChange::Unchanged => Outcome::Skipped("already linked".to_string()),
    }
}

/// Fold two effect outcomes into the one reported for the file.
fn prefer(a: Outcome, b: Outcome) -> Outcome {
    fn rank(o: &Outcome) -> u8 {
        match o {
            Outcome::Failed { .. } => 4,
            Outcome::Suppressed(_) => 3,
            Outcome::WouldDo(_) => 2,
            Outcome::Done(_) => 1,
            Outcome::Skipped(_) | Outcome::State(_) => 0,
        }
    }
    if rank(&b) >= rank(&a) { b } else { a }
}
