//! Symlink handler: the only handler that creates user-visible links.
//!
//! Each match becomes two calls: an intermediate link in the state tree,
//! then a user link pointing at the intermediate. The user target defaults
//! to the resolver mapping and can be overridden per rule with a `target`
//! option.

use std::path::PathBuf;

use crate::error::Error;
use crate::handlers::{Effect, Handler, PlanContext, check_options};
use crate::paths::Paths;
use crate::platform::Fs;
use crate::rules::RuleMatch;

/// The expected user-visible path for a symlink match: the `target` option
/// when set, the resolver mapping otherwise. Shared with the status
/// inspector.
pub(crate) fn user_target(paths: &Paths, m: &RuleMatch) -> PathBuf {
    match m.options.get("target").and_then(|v| v.as_str()) {
        Some(target) => paths.expand_tilde(target),
        None => paths.map_pack_file_to_system(&m.rel),
    }
}

pub(crate) fn plan<F: Fs>(ctx: &PlanContext<'_, F>, m: &RuleMatch) -> Result<Vec<Effect>, Error> {
    check_options("symlink", &m.options, &["target"])?;

    let user_path = user_target(ctx.paths, m);

    Ok(vec![
        Effect::DataLink {
            pack: m.pack.clone(),
            handler: Handler::Symlink,
            source: m.abs.clone(),
        },
        Effect::UserLink {
            pack: m.pack.clone(),
            handler: Handler::Symlink,
            source: m.abs.clone(),
            user_path,
        },
    ])
}
