use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::runner::result::TestFailure;

/// Something that runs a test and reports pass or fail.
///
/// Any `FnMut() -> Result<(), TestFailure>` is an action.
pub trait TestAction {
    /// Run the test once.
    ///
    /// # Errors
    ///
    /// Returns a [`TestFailure`] when the test does not pass.
    fn run(&mut self) -> Result<(), TestFailure>;
}

impl<F> TestAction for F
where
    F: FnMut() -> Result<(), TestFailure>,
{
    fn run(&mut self) -> Result<(), TestFailure> {
        self()
    }
}

/// How shell actions are launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Shell interpreter (default: "/bin/sh").
    pub shell: String,
    /// Flags placed before the command (default: ["-c"]).
    pub shell_args: Vec<String>,
    /// Directory commands run in.
    pub working_dir: PathBuf,
    /// Extra environment for every command.
    pub env: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_owned(),
            shell_args: vec!["-c".to_owned()],
            working_dir: PathBuf::from("."),
            env: BTreeMap::new(),
        }
    }
}

/// A test action that runs a shell command and passes on exit status 0.
#[derive(Debug, Clone)]
pub struct ShellAction {
    pub command: String,
    pub config: ShellConfig,
}

impl ShellAction {
    pub fn new(command: impl Into<String>, config: ShellConfig) -> Self {
        Self {
            command: command.into(),
            config,
        }
    }
}

impl TestAction for ShellAction {
    fn run(&mut self) -> Result<(), TestFailure> {
        let output = Command::new(&self.config.shell)
            .args(&self.config.shell_args)
            .arg(&self.command)
            .current_dir(&self.config.working_dir)
            .envs(&self.config.env)
            .output()
            .map_err(|e| {
                TestFailure::new(format!("failed to start '{}': {e}", self.config.shell))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let code = output
            .status
            .code()
            .map_or_else(|| "a signal".to_owned(), |c| format!("status {c}"));
        let mut message = format!("`{}` exited with {code}", self.command);

        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(line) = stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            message.push_str(": ");
            message.push_str(line.trim());
        }

        Err(TestFailure::new(message))
    }
}
