//! CLI argument parsing using clap derive macros

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::exec::SystemRunner;
use crate::pipeline::{Pipeline, Plan};
use crate::sections;
use crate::utils::terminal;

/// purgebuild - build, collect and package in one step
///
/// Arguments are grouped into sections by marker tokens. Everything after
/// `@cargo` (or `@build`) goes to cargo, everything after `@run` (or `@pack`)
/// goes to the packager. Driver options must come before the first marker.
#[derive(Parser, Debug)]
#[command(name = "purgebuild")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    purgebuild @cargo build --release @run compress in.txt out.ppcb\n  \
    purgebuild @cargo check\n  \
    purgebuild @run decompress -s archive.ppcb restored.txt")]
pub struct Cli {
    /// Print each command line and stage timing
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show what would run without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Invocation root (defaults to the current directory)
    #[arg(short = 'C', long, env = "PURGEBUILD_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to purgebuild.toml in the root)
    #[arg(long, env = "PURGEBUILD_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sectioned arguments: @cargo <cargo args>... @run <packager args>...
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(OsString)
    )]
    pub args: Vec<OsString>,
}

impl Cli {
    /// Execute the driver
    pub fn execute(self) -> Result<(), DriverError> {
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let split = sections::split(self.args);
        for warning in &split.warnings {
            terminal::print_warning(&warning.to_string());
        }

        // Nothing to run, so configuration is not even read
        if split.sections.is_empty() {
            if self.dry_run || self.verbose {
                terminal::print_info("nothing to do: no sections given");
            }
            return Ok(());
        }

        let cwd = std::env::current_dir()
            .context("Failed to get current directory")
            .map_err(|e| DriverError::config_error_with_source("no invocation root", e))?;
        let root = resolve_root(self.root.as_deref(), &cwd);

        let config = DriverConfig::load(&root, self.config.as_deref()).map_err(|e| {
            DriverError::config_error_with_source("could not load driver configuration", e)
        })?;

        let plan = Plan::new(&split.sections, &root, &config);

        if self.dry_run || self.verbose {
            plan.print();
        }
        if self.dry_run {
            return Ok(());
        }

        let report = Pipeline::new(SystemRunner, self.verbose).execute(&plan)?;
        if self.verbose {
            terminal::print_info(&format!(
                "done: built={}, modules collected={}, packaged={}",
                report.built,
                report.collected.len(),
                report.packaged
            ));
        }
        Ok(())
    }
}

/// Invocation root as an absolute path.
///
/// Children are started inside the root or below it, so every program path
/// handed to them has to stay valid after their working directory changes.
fn resolve_root(root: Option<&Path>, cwd: &Path) -> PathBuf {
    match root {
        Some(root) => cwd.join(root),
        None => cwd.to_path_buf(),
    }
}
