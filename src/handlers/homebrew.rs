//! Homebrew handler: `brew bundle` over a pack's Brewfile.
//!
//! The sentinel name is prefixed with the pack so Brewfiles from different
//! packs never collide in a shared listing. Checksum is over the Brewfile
//! contents.

use crate::checksum::sha256_file;
use crate::error::Error;
use crate::handlers::{Effect, Handler, PlanContext, check_options, sentinel_name};
use crate::platform::{Fs, RunCommand};
use crate::rules::RuleMatch;

pub(crate) fn plan<F: Fs>(ctx: &PlanContext<'_, F>, m: &RuleMatch) -> Result<Vec<Effect>, Error> {
    check_options("homebrew", &m.options, &[])?;

    let checksum = sha256_file(ctx.fs, &m.abs)?;
    let sentinel = sentinel_name(Handler::Homebrew, &m.pack, &m.abs, &checksum);
    let command = RunCommand::new("brew")
        .arg("bundle")
        .arg("--file")
        .arg(m.abs.to_string_lossy());

    Ok(vec![Effect::Provision {
        pack: m.pack.clone(),
        handler: Handler::Homebrew,
        source: m.abs.clone(),
        sentinel,
        command,
    }])
}
