//! Ctrl-C as a flag instead of process death.
//!
//! The terminal delivers SIGINT to the whole foreground process group, so the
//! running child exits on its own; the pipeline notices the raised flag once
//! control returns to it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

static PROCESS_FLAG: OnceLock<InterruptFlag> = OnceLock::new();

/// Route SIGINT into the returned flag. Repeated calls return the same flag.
///
/// Only Unix gets a handler; elsewhere the default behavior is kept and the
/// flag never rises.
pub fn install() -> InterruptFlag {
    let flag = PROCESS_FLAG.get_or_init(InterruptFlag::new).clone();

    #[cfg(unix)]
    {
        let handler = on_sigint as extern "C" fn(libc::c_int);
        // SAFETY: the handler only performs an atomic store on a flag that
        // lives for the rest of the process.
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }

    flag
}

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    if let Some(flag) = PROCESS_FLAG.get() {
        flag.raise();
    }
}
