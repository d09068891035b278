//! Serialising mutating commands against one state tree.
//!
//! `on` and `off` hold the lock for the length of the command; `status`
//! stays lock-free. Contention is expected to be rare and short (another
//! dodot run finishing up), so waiting is a bounded poll rather than a
//! blocking OS wait — polling lets the failure message name the holder's
//! PID.

use anyhow::{Result, anyhow};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::platform::Locker;

const RETRY_INTERVAL: Duration = Duration::from_millis(250);

/// Wait until the state-tree lock is ours or `patience` runs out.
///
/// With zero patience a busy lock fails on the first poll.
pub fn wait_for_lock(locker: &mut impl Locker, patience: Duration) -> Result<()> {
    let deadline = Instant::now() + patience;
    loop {
        if locker.try_lock()? {
            debug!("Holding lock {}", locker.lock_path().display());
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(contended(locker, patience));
        }
        debug!(
            "Lock {} is busy, retrying in {}ms",
            locker.lock_path().display(),
            RETRY_INTERVAL.as_millis()
        );
        std::thread::sleep(RETRY_INTERVAL);
    }
}

fn contended(locker: &impl Locker, waited: Duration) -> anyhow::Error {
    let path = locker.lock_path().display();
    let secs = waited.as_secs();
    match locker.owner_pid() {
        Some(pid) => anyhow!(
            "Gave up on lock {path} after {secs}s: held by PID {pid}. \
             Wait for that dodot run to finish, or delete the lock file if the process is gone."
        ),
        None => anyhow!(
            "Gave up on lock {path} after {secs}s. \
             Delete the lock file if no other dodot run is active."
        ),
    }
}
