//! Error types and helpers for user-friendly error messages
//!
//! Every fatal condition of the pipeline ends up as a [`DriverError`], which
//! knows how to present itself and which exit code the process should use.

use std::path::PathBuf;

use thiserror::Error;

use crate::utils::terminal;

/// Pipeline stage, used to tell the user where things went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Collect,
    Run,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Build => write!(f, "build"),
            Stage::Collect => write!(f, "module collection"),
            Stage::Run => write!(f, "packaging"),
        }
    }
}

/// Fatal driver errors
#[derive(Error, Debug)]
pub enum DriverError {
    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Tool/executable not found
    #[error("Missing tool: {tool} (required for {stage} stage)")]
    MissingTool {
        tool: String,
        stage: Stage,
        hint: String,
    },

    /// The subprocess could not be started at all
    #[error("{stage} stage failed: could not start {program}")]
    Spawn {
        stage: Stage,
        program: String,
        #[source]
        source: anyhow::Error,
    },

    /// The subprocess ran and reported failure
    #[error("{stage} stage failed: {}", describe_exit(.code))]
    StageFailed { stage: Stage, code: Option<i32> },

    /// Directory creation or file relocation failed
    #[error("{stage} stage failed: {message} ({})", .path.display())]
    Filesystem {
        stage: Stage,
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("process exited with code {}", code),
        None => "process terminated by signal".to_string(),
    }
}

impl DriverError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with its cause
    pub fn config_error_with_source(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(tool: impl Into<String>, stage: Stage, hint: impl Into<String>) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            stage,
            hint: hint.into(),
        }
    }

    /// Create a filesystem error
    pub fn filesystem(
        stage: Stage,
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            stage,
            message: message.into(),
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// A failing child passes its own status through; anything the driver
    /// detects itself exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::StageFailed { code: Some(code), .. } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        terminal::print_error(&self.to_string());

        match self {
            DriverError::Config { source: Some(source), .. } => {
                terminal::print_hint(&format!("{:#}", source));
            }
            DriverError::Spawn { source, .. } => {
                terminal::print_hint(&format!("{:#}", source));
            }
            DriverError::Filesystem { source, .. } => {
                terminal::print_hint(&source.to_string());
            }
            DriverError::MissingTool { hint, .. } => {
                terminal::print_hint(hint);
            }
            _ => {}
        }
    }
}

/// Common error hints for missing tools
pub mod hints {
    /// Get hint for a toolchain that is not on PATH
    pub fn cargo() -> &'static str {
        "Install Rust from https://rustup.rs/ or point [toolchain] program\n\
         in purgebuild.toml at an existing cargo executable."
    }

    /// Get hint for a packager that is not next to the build output
    pub fn packager() -> &'static str {
        "The packager runs from the build output directory. Build it first:\n\
         • Run: purgebuild @cargo build\n\
         • Or set [packager] name in purgebuild.toml"
    }
}
