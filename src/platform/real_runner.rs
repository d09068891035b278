//! Real subprocess runner backed by `std::process::Command`.

use std::io;
use std::process::Command;

use super::{RunCommand, RunOutput, Runner};

/// Real runner — spawns the command and waits for it with captured output.
///
/// The child inherits the current environment; install scripts and
/// `brew bundle` both rely on that.
pub struct RealRunner;

impl Runner for RealRunner {
    fn run(&self, command: &RunCommand) -> io::Result<RunOutput> {
        let output = Command::new(&command.program).args(&command.args).output()?;

        Ok(RunOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
