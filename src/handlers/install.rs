//! Install handler: one-shot provisioning scripts.
//!
//! The script is invoked directly (its shebang executes it) and re-runs
//! only when its content changes: the sentinel name embeds the SHA-256 of
//! the script at planning time.

use crate::checksum::sha256_file;
use crate::error::Error;
use crate::handlers::{Effect, Handler, PlanContext, check_options, sentinel_name};
use crate::platform::{Fs, RunCommand};
use crate::rules::RuleMatch;

pub(crate) fn plan<F: Fs>(ctx: &PlanContext<'_, F>, m: &RuleMatch) -> Result<Vec<Effect>, Error> {
    check_options("install", &m.options, &[])?;

    let checksum = sha256_file(ctx.fs, &m.abs)?;
    let sentinel = sentinel_name(Handler::Install, &m.pack, &m.abs, &checksum);

    Ok(vec![Effect::Provision {
        pack: m.pack.clone(),
        handler: Handler::Install,
        source: m.abs.clone(),
        sentinel,
        command: RunCommand::new(m.abs.to_string_lossy()),
    }])
}
