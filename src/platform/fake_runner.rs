//! Fake subprocess runner for testing.
//!
//! Records every invocation and returns scripted results registered via
//! `set_result()`. Unregistered programs succeed with empty output, so tests
//! only script the failures they care about.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use super::{RunCommand, RunOutput, Runner};

/// In-memory runner — no subprocess is ever spawned.
pub struct FakeRunner {
    calls: RefCell<Vec<RunCommand>>,
    /// Scripted results keyed by program name/path.
    results: RefCell<HashMap<String, RunOutput>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            results: RefCell::new(HashMap::new()),
        }
    }

    /// Script the result returned when `program` is run.
    /// Returns the previously scripted result, if any.
    pub fn set_result(
        &self,
        program: &str,
        exit_code: i32,
        stdout: &str,
        stderr: &str,
    ) -> Option<RunOutput> {
        self.results.borrow_mut().insert(
            program.to_string(),
            RunOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        )
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<RunCommand> {
        self.calls.borrow().clone()
    }

    /// Number of commands run so far.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Runner for FakeRunner {
    fn run(&self, command: &RunCommand) -> io::Result<RunOutput> {
        self.calls.borrow_mut().push(command.clone());
        let scripted = self.results.borrow().get(&command.program).cloned();
        Ok(scripted.unwrap_or(RunOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscripted_command_succeeds() {
        let runner = FakeRunner::new();
        let out = runner.run(&RunCommand::new("/d/dev/install.sh")).unwrap();
        assert!(out.success());
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn scripted_failure_is_returned() {
        let runner = FakeRunner::new();
        runner.set_result("brew", 1, "", "bundle failed");
        let out = runner
            .run(&RunCommand::new("brew").arg("bundle"))
            .unwrap();
        assert_eq!(out.exit_code, 1);
        assert_eq!(out.stderr, "bundle failed");
    }

    #[test]
    fn records_arguments() {
        let runner = FakeRunner::new();
        let cmd = RunCommand::new("brew")
            .arg("bundle")
            .arg("--file")
            .arg("/d/tools/Brewfile");
        runner.run(&cmd).unwrap();
        assert_eq!(runner.calls(), vec![cmd]);
    }
}
