#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use devflow::console::Console;
use devflow::error::Error;
use devflow::interrupt::InterruptFlag;
use devflow::invocation::{ExecutionMode, ExecutionResult, Invocation};
use devflow::readiness::Clock;
use devflow::runner::{CommandRunner, OutputLines};

#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Reply {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn ok_with(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Self::default()
        }
    }

    pub fn fail(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub display: String,
    pub mode: ExecutionMode,
}

/// Answers invocations from a script keyed by display text.
///
/// Each key holds a queue of replies; the last reply repeats. Unscripted
/// commands succeed with no output.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    calls: RefCell<Vec<Call>>,
    interrupts: RefCell<HashMap<String, InterruptFlag>>,
    unstartable: RefCell<HashSet<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, command: &str, reply: Reply) -> Self {
        self.replies
            .borrow_mut()
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Raise `flag` while `command` runs, the way Ctrl-C would.
    pub fn interrupt_during(self, command: &str, flag: &InterruptFlag) -> Self {
        self.interrupts
            .borrow_mut()
            .insert(command.to_string(), flag.clone());
        self
    }

    /// Make `command` fail to spawn, as a missing executable would.
    pub fn cannot_start(self, command: &str) -> Self {
        self.unstartable.borrow_mut().insert(command.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn displays(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.display.clone()).collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.display == command)
            .count()
    }

    fn reply(&self, invocation: &Invocation) -> devflow::Result<Reply> {
        self.calls.borrow_mut().push(Call {
            display: invocation.display.clone(),
            mode: invocation.mode,
        });

        if self.unstartable.borrow().contains(&invocation.display) {
            return Err(Error::command_spawn_failed(
                invocation.display.clone(),
                "No such file or directory (os error 2)",
            ));
        }

        if let Some(flag) = self.interrupts.borrow().get(&invocation.display) {
            flag.raise();
        }

        let mut replies = self.replies.borrow_mut();
        let reply = match replies.get_mut(&invocation.display) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => Reply::ok(),
        };
        Ok(reply)
    }
}

struct ScriptedLines {
    lines: std::vec::IntoIter<String>,
    exit_code: i32,
}

impl Iterator for ScriptedLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.lines.next()
    }
}

impl OutputLines for ScriptedLines {
    fn finish(self: Box<Self>) -> devflow::Result<i32> {
        Ok(self.exit_code)
    }
}

impl CommandRunner for ScriptedRunner {
    fn capture(&self, invocation: &Invocation) -> devflow::Result<ExecutionResult> {
        let reply = self.reply(invocation)?;
        Ok(ExecutionResult {
            exit_code: reply.exit_code,
            stdout: reply.stdout,
            stderr: reply.stderr,
        })
    }

    fn stream(&self, invocation: &Invocation) -> devflow::Result<Box<dyn OutputLines>> {
        let reply = self.reply(invocation)?;
        let lines: Vec<String> = reply.stdout.lines().map(|l| l.to_string()).collect();
        Ok(Box::new(ScriptedLines {
            lines: lines.into_iter(),
            exit_code: reply.exit_code,
        }))
    }

    fn inherit(&self, invocation: &Invocation) -> devflow::Result<i32> {
        Ok(self.reply(invocation)?.exit_code)
    }
}

/// Time only moves when something sleeps.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.now.get()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.now.set(self.now.get() + duration);
    }
}

#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console writing into two inspectable buffers, without color.
pub fn captured_console() -> (Console, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let console = Console::new(Box::new(out.clone()), Box::new(err.clone()), false);
    (console, out, err)
}
