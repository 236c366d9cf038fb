//! User-facing status output: colored, timestamped stage lines and the spinner.

use std::io::{self, Write};

use chrono::Local;

const RESET: &str = "\x1b[0m";

/// Status line colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Blue,
    Cyan,
    Green,
    Yellow,
    Red,
}

impl Tone {
    fn ansi(&self) -> &'static str {
        match self {
            Tone::Header => "\x1b[95m",
            Tone::Blue => "\x1b[94m",
            Tone::Cyan => "\x1b[96m",
            Tone::Green => "\x1b[92m",
            Tone::Yellow => "\x1b[93m",
            Tone::Red => "\x1b[91m",
        }
    }
}

/// `<icon> [HH:MM:SS] <STEP>: <message>`, wrapped in color when enabled.
pub fn format_status(
    icon: &str,
    tone: Tone,
    step: &str,
    message: &str,
    timestamp: &str,
    color: bool,
) -> String {
    let line = format!("{} [{}] {}: {}", icon, timestamp, step, message);
    paint(&line, tone, color)
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if color {
        format!("{}{}{}", tone.ansi(), text, RESET)
    } else {
        text.to_string()
    }
}

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Rotating liveness indicator. Frame `n` is `SPINNER_FRAMES[n % 10]`.
#[derive(Debug, Default)]
pub struct Spinner {
    ticks: usize,
}

impl Spinner {
    pub fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.ticks % SPINNER_FRAMES.len()]
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
    }
}

/// Writes status output. Write errors are ignored.
pub struct Console {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    color: bool,
    spinner_active: bool,
}

impl Console {
    pub fn new(out: Box<dyn Write>, err: Box<dyn Write>, color: bool) -> Self {
        Self {
            out,
            err,
            color,
            spinner_active: false,
        }
    }

    pub fn stdio(color: bool) -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()), color)
    }

    /// Discards everything.
    pub fn silent() -> Self {
        Self::new(Box::new(io::sink()), Box::new(io::sink()), false)
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn status(&mut self, icon: &str, tone: Tone, step: &str, message: &str) {
        self.end_spinner();
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let line = format_status(icon, tone, step, message, &timestamp, self.color);
        writeln!(self.out, "{}", line).ok();
    }

    pub fn header(&mut self, icon: &str, title: &str) {
        self.end_spinner();
        let text = format!("{} {}", icon, title);
        writeln!(self.out).ok();
        writeln!(self.out, "{}", paint(&text, Tone::Header, self.color)).ok();
    }

    pub fn line(&mut self, text: &str) {
        self.end_spinner();
        writeln!(self.out, "{}", text).ok();
    }

    pub fn error_line(&mut self, text: &str) {
        self.end_spinner();
        writeln!(self.err, "{}", text).ok();
    }

    /// Redraw the spinner in place on the current line.
    pub fn spinner(&mut self, frame: &str, message: &str) {
        write!(self.out, "\r{} {}", frame, message).ok();
        self.out.flush().ok();
        self.spinner_active = true;
    }

    /// Move off the spinner line, if one is showing.
    pub fn end_spinner(&mut self) {
        if self.spinner_active {
            writeln!(self.out).ok();
            self.spinner_active = false;
        }
    }

    pub fn flush(&mut self) {
        self.out.flush().ok();
        self.err.flush().ok();
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.flush();
    }
}
