//! A single external command, described before it runs.

use serde::Serialize;

use crate::error::Result;
use crate::shell;
use crate::utils::{command, validation};

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Collect stdout and stderr until the process exits.
    Capture,
    /// Pull stdout line by line while the process runs.
    Stream,
    /// The child owns the terminal.
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Text shown to the user and reported on failure.
    pub display: String,
    pub mode: ExecutionMode,
}

impl Invocation {
    /// Build from a command line split on whitespace, without a shell.
    pub fn from_command_line(line: &str, mode: ExecutionMode) -> Result<Self> {
        let mut parts = command::split_command_line(line).into_iter();
        let program = validation::require(parts.next(), "command", "Command line is empty")?;
        let args: Vec<String> = parts.collect();
        let display = shell::join_command(&program, &args);

        Ok(Self {
            program,
            args,
            display,
            mode,
        })
    }

    /// Run `command` through the platform shell so configured commands may use shell syntax.
    pub fn shell(command: &str, mode: ExecutionMode) -> Self {
        #[cfg(windows)]
        let (program, flag) = ("cmd", "/C");

        #[cfg(not(windows))]
        let (program, flag) = ("sh", "-c");

        Self {
            program: program.to_string(),
            args: vec![flag.to_string(), command.to_string()],
            display: command.to_string(),
            mode,
        }
    }
}

/// Result of a captured invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
