//! Packaging executable invocation

use std::ffi::OsString;
use std::path::Path;

use crate::error::{hints, DriverError, Stage};
use crate::exec::CommandRunner;

use super::{check_status, spawn_error};

/// Run the packager found at `packager` with the run section's arguments.
///
/// The packager reads its modules relative to its working directory, so it
/// is started from `work_dir`, the build output directory when a build just
/// ran and the invocation root otherwise.
pub fn invoke_packager<R: CommandRunner>(
    runner: &mut R,
    packager: &Path,
    args: &[OsString],
    work_dir: &Path,
    verbose: bool,
) -> Result<(), DriverError> {
    if !packager.is_file() {
        return Err(DriverError::missing_tool(
            packager.display().to_string(),
            Stage::Run,
            hints::packager(),
        ));
    }

    let result = runner
        .run(packager, args, work_dir)
        .map_err(|e| spawn_error(Stage::Run, packager, e))?;

    check_status(Stage::Run, packager, args, &result, verbose)
}
