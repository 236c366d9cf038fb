//! Process execution behind a trait, so pipelines can be driven by scripted fakes.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::error::{Error, Result};
use crate::invocation::{ExecutionResult, Invocation};
use crate::utils::command;

/// Stdout of a running child, pulled one line at a time.
///
/// Lines come without their terminator. `finish` drains whatever is left,
/// waits for the process and returns its exit code.
pub trait OutputLines: Iterator<Item = String> {
    fn finish(self: Box<Self>) -> Result<i32>;
}

pub trait CommandRunner {
    /// Run to completion, collecting stdout and stderr.
    fn capture(&self, invocation: &Invocation) -> Result<ExecutionResult>;

    /// Start the process and hand back its stdout as a line iterator.
    fn stream(&self, invocation: &Invocation) -> Result<Box<dyn OutputLines>>;

    /// Run with inherited stdio and return the exit code.
    fn inherit(&self, invocation: &Invocation) -> Result<i32>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd
    }
}

fn spawn_error(invocation: &Invocation, err: std::io::Error) -> Error {
    Error::command_spawn_failed(invocation.display.clone(), err.to_string())
}

impl CommandRunner for SystemRunner {
    fn capture(&self, invocation: &Invocation) -> Result<ExecutionResult> {
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(invocation, e))?;

        Ok(ExecutionResult {
            exit_code: command::exit_code(output.status),
            stdout: command::output_text(&output.stdout),
            stderr: command::output_text(&output.stderr),
        })
    }

    fn stream(&self, invocation: &Invocation) -> Result<Box<dyn OutputLines>> {
        // stderr goes straight to the terminal; an unread pipe could stall the child.
        let mut child = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(invocation, e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            Error::internal_io(
                "child stdout was not captured",
                Some(invocation.display.clone()),
            )
        })?;

        Ok(Box::new(ChildLines {
            child,
            reader: BufReader::new(stdout),
            display: invocation.display.clone(),
        }))
    }

    fn inherit(&self, invocation: &Invocation) -> Result<i32> {
        let status = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(invocation, e))?;

        Ok(command::exit_code(status))
    }
}

struct ChildLines {
    child: Child,
    reader: BufReader<ChildStdout>,
    display: String,
}

impl Iterator for ChildLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let line = command::output_text(&buf);
                Some(command::trim_line_ending(&line).to_string())
            }
        }
    }
}

impl OutputLines for ChildLines {
    fn finish(self: Box<Self>) -> Result<i32> {
        let mut this = *self;
        for _ in this.by_ref() {}

        let status = this
            .child
            .wait()
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("wait {}", this.display))))?;

        Ok(command::exit_code(status))
    }
}
