//! purgebuild - build driver for purgepack
//!
//! Runs cargo, moves the freshly built module libraries into the `modules`
//! directory next to the build output, then launches the packager from there.
//!
//! ## Architecture
//!
//! ```text
//! argv → sections → plan → cargo → collect modules → purgepack
//! ```

mod cli;
mod config;
mod error;
mod exec;
mod pipeline;
mod sections;
mod utils;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        err.display_with_hints();
        std::process::exit(err.exit_code());
    }
}
