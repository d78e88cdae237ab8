//! Blocking subprocess execution with inherited stdio

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Result of a subprocess execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code, `None` when the child was killed by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            exit_code: status.code(),
            duration,
        }
    }

    /// Whether the command succeeded (exit code 0)
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can run a program to completion
pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, blocking until it exits.
    ///
    /// Errors are reserved for failures to start the process; a non-zero
    /// exit is reported through [`CommandResult`].
    fn run(&mut self, program: &Path, args: &[OsString], cwd: &Path) -> Result<CommandResult>;
}

/// Runs real processes with stdin/stdout/stderr inherited from the driver
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &Path, args: &[OsString], cwd: &Path) -> Result<CommandResult> {
        run_command(program, args, cwd)
    }
}

/// Run a command with inherited stdio and wait for it
pub fn run_command(program: &Path, args: &[OsString], cwd: &Path) -> Result<CommandResult> {
    let start = Instant::now();

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute {}", program.display()))?;

    Ok(CommandResult::from_status(status, start.elapsed()))
}

/// Resolve a program through PATH, leaving explicit paths alone
pub fn resolve_program(program: &str, cwd: &Path) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            cwd.join(candidate)
        };
        return path.is_file().then_some(path);
    }
    which::which(program).ok()
}
