//! Configuration validation

use std::path::{Component, Path};

use anyhow::Result;

use super::DriverConfig;
use crate::error::DriverError;

/// Validate the entire driver configuration
pub fn validate_config(config: &DriverConfig) -> Result<()> {
    if config.toolchain.program.trim().is_empty() {
        return Err(DriverError::config_error("[toolchain] program cannot be empty").into());
    }

    validate_packager_name(&config.packager.name)?;
    validate_modules_dir(&config.modules.dir)?;

    Ok(())
}

/// The packager is looked up next to the build output, so only a bare file name makes sense
fn validate_packager_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DriverError::config_error("[packager] name cannot be empty").into());
    }

    if name.contains('/') || name.contains('\\') {
        return Err(DriverError::config_error(format!(
            "[packager] name '{}' must be a file name, not a path",
            name
        ))
        .into());
    }

    Ok(())
}

fn validate_modules_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(DriverError::config_error("[modules] dir cannot be empty").into());
    }

    let escapes = dir
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(DriverError::config_error(format!(
            "[modules] dir '{}' must be a relative path inside the build output directory",
            dir.display()
        ))
        .into());
    }

    // "." or "./." would make the modules directory the output directory itself
    if !dir.components().any(|c| matches!(c, Component::Normal(_))) {
        return Err(DriverError::config_error(format!(
            "[modules] dir '{}' must name a subdirectory of the build output directory",
            dir.display()
        ))
        .into());
    }

    Ok(())
}
