//! Terminal output utilities
//!
//! Diagnostics (errors, warnings, hints) go to stderr so they never mix with
//! the forwarded output of cargo or the packager on stdout.

use std::ffi::OsString;

use console::{style, Color};

/// Kind of message, which decides the label, its colour and the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Error,
    Warning,
    Hint,
    Info,
    Success,
}

impl Level {
    fn label(self) -> (&'static str, Color) {
        match self {
            Level::Error => ("error", Color::Red),
            Level::Warning => ("warning", Color::Yellow),
            Level::Hint => ("hint", Color::Cyan),
            Level::Info => ("info", Color::Blue),
            Level::Success => ("success", Color::Green),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Error | Level::Warning | Level::Hint)
    }
}

fn emit(level: Level, message: &str) {
    let (label, color) = level.label();
    let label = style(label).fg(color).bold();
    if level.to_stderr() {
        eprintln!("{}: {}", label, message);
    } else {
        println!("{}: {}", label, message);
    }
}

pub fn print_error(message: &str) {
    emit(Level::Error, message);
}

pub fn print_warning(message: &str) {
    emit(Level::Warning, message);
}

/// Follow-up line printed under an error
pub fn print_hint(message: &str) {
    emit(Level::Hint, message);
}

pub fn print_info(message: &str) {
    emit(Level::Info, message);
}

pub fn print_success(message: &str) {
    emit(Level::Success, message);
}

/// Render a command line for display, quoting arguments that contain spaces
pub fn format_command(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.to_string_lossy();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push_str(&format!("{:?}", &*arg));
        } else {
            line.push_str(&arg);
        }
    }
    line
}
