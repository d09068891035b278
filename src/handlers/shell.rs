//! Shell handler: scripts sourced at login.
//!
//! Only an intermediate link is created; the shell init snippet sources
//! every link under `<data>/packs/*/shell/`.

use crate::error::Error;
use crate::handlers::{Effect, Handler, check_options};
use crate::rules::RuleMatch;

pub(crate) fn plan(m: &RuleMatch) -> Result<Vec<Effect>, Error> {
    check_options("shell", &m.options, &[])?;
    Ok(vec![Effect::DataLink {
        pack: m.pack.clone(),
        handler: Handler::Shell,
        source: m.abs.clone(),
    }])
}
