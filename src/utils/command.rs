//! Command execution primitives with zero domain knowledge.

use std::process::ExitStatus;

/// Split a command line on whitespace. No quoting rules apply.
pub fn split_command_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(|s| s.to_string()).collect()
}

/// Exit code of a finished process; `-1` when it was killed by a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Decode process output, replacing invalid UTF-8.
pub fn output_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

/// Strip the line terminator left by `read_until`.
pub fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
