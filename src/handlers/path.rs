//! Path handler: deploys whole directories onto the login PATH.
//!
//! Only an intermediate link is created; the shell init snippet enumerates
//! `<data>/packs/*/path/*` at login and prepends each target.

use crate::error::Error;
use crate::handlers::{Effect, Handler, check_options};
use crate::rules::RuleMatch;

pub(crate) fn plan(m: &RuleMatch) -> Result<Vec<Effect>, Error> {
    check_options("path", &m.options, &[])?;
    Ok(vec![Effect::DataLink {
        pack: m.pack.clone(),
        handler: Handler::Path,
        source: m.abs.clone(),
    }])
}
