//! Terminal detection for CLI output.

use std::env;
use std::io::{self, IsTerminal};

pub fn is_stdout_tty() -> bool {
    io::stdout().is_terminal()
}

/// Colors only for a terminal, and never when `NO_COLOR` is set or `--no-color` was passed.
pub fn color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    is_stdout_tty()
}
