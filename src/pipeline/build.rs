//! Toolchain invocation and output-directory inference

use std::ffi::OsString;
use std::path::Path;

use crate::error::{hints, DriverError, Stage};
use crate::exec::subprocess::resolve_program;
use crate::exec::CommandRunner;
use crate::pipeline::Profile;

use super::{check_status, spawn_error};

/// Tokens that ask cargo to build
const BUILD_ACTIONS: &[&str] = &["build", "b"];

/// Tokens that select the release profile
const RELEASE_FLAGS: &[&str] = &["--release", "-r"];

/// Infer which output directory a build section writes to.
///
/// Returns `None` when the arguments carry no build action, in which case
/// there are no artifacts to place and collection is skipped.
pub fn infer_profile(args: &[OsString]) -> Option<Profile> {
    let has_any = |tokens: &[&str]| {
        args.iter()
            .filter_map(|a| a.to_str())
            .any(|a| tokens.contains(&a))
    };

    if !has_any(BUILD_ACTIONS) {
        return None;
    }

    if has_any(RELEASE_FLAGS) {
        Some(Profile::Release)
    } else {
        Some(Profile::Debug)
    }
}

/// Run the toolchain with the build section's arguments from `root`
pub fn invoke_toolchain<R: CommandRunner>(
    runner: &mut R,
    program: &str,
    args: &[OsString],
    root: &Path,
    verbose: bool,
) -> Result<(), DriverError> {
    let resolved = resolve_program(program, root)
        .ok_or_else(|| DriverError::missing_tool(program, Stage::Build, hints::cargo()))?;

    let result = runner
        .run(&resolved, args, root)
        .map_err(|e| spawn_error(Stage::Build, &resolved, e))?;

    check_status(Stage::Build, &resolved, args, &result, verbose)
}
