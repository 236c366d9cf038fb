//! Bounded readiness polling.
//!
//! `ReadinessMachine` is the pure POLLING → READY | TIMEOUT state machine.
//! `poll_until_ready` drives it against a probe, a `Clock`, and a tick
//! callback (where the caller draws its spinner).

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::interrupt::InterruptFlag;

/// Monotonic time source that can also wait.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    Polling,
    Ready,
    TimedOut,
}

impl ReadinessState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReadinessState::Polling)
    }
}

/// Terminal states are sticky: once READY or TIMEOUT, further input is ignored.
#[derive(Debug, Clone)]
pub struct ReadinessMachine {
    policy: ReadinessPolicy,
    state: ReadinessState,
    attempts: u32,
}

impl ReadinessMachine {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self {
            policy,
            state: ReadinessState::Polling,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Checked before each probe. Once `elapsed` reaches the timeout no
    /// further probe may run.
    pub fn check_deadline(&mut self, elapsed: Duration) -> ReadinessState {
        if self.state == ReadinessState::Polling && elapsed >= self.policy.timeout {
            self.state = ReadinessState::TimedOut;
        }
        self.state
    }

    /// Record one probe result.
    pub fn record_probe(&mut self, ready: bool) -> ReadinessState {
        if self.state != ReadinessState::Polling {
            return self.state;
        }
        self.attempts += 1;
        if ready {
            self.state = ReadinessState::Ready;
        }
        self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessOutcome {
    pub state: ReadinessState,
    pub elapsed: Duration,
    pub attempts: u32,
}

/// Probe until ready or out of time.
///
/// The deadline is checked before every probe; after a failed probe `on_tick`
/// runs and the clock sleeps one interval. An interrupt observed at any point
/// returns `Error::interrupted`.
pub fn poll_until_ready(
    policy: ReadinessPolicy,
    clock: &dyn Clock,
    interrupt: &InterruptFlag,
    probe: &mut dyn FnMut() -> Result<bool>,
    on_tick: &mut dyn FnMut(u32),
) -> Result<ReadinessOutcome> {
    let mut machine = ReadinessMachine::new(policy);
    let started = clock.now();

    loop {
        if interrupt.is_set() {
            return Err(Error::interrupted());
        }

        let elapsed = clock.now().saturating_sub(started);
        if machine.check_deadline(elapsed).is_terminal() {
            return Ok(outcome(&machine, elapsed));
        }

        let ready = probe()?;
        if interrupt.is_set() {
            return Err(Error::interrupted());
        }

        if machine.record_probe(ready).is_terminal() {
            let elapsed = clock.now().saturating_sub(started);
            return Ok(outcome(&machine, elapsed));
        }

        on_tick(machine.attempts());
        clock.sleep(policy.interval);
    }
}

fn outcome(machine: &ReadinessMachine, elapsed: Duration) -> ReadinessOutcome {
    ReadinessOutcome {
        state: machine.state(),
        elapsed,
        attempts: machine.attempts(),
    }
}
