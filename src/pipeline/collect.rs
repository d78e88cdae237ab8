//! Relocation of freshly built dynamic libraries into the modules directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{DriverError, Stage};
use crate::utils::paths::is_dynamic_library;
use crate::utils::terminal;

/// Move every dynamic library directly inside `output_dir` into `modules_dir`.
///
/// `modules_dir` is created on first need. Subdirectories are not scanned and
/// other files are left alone. An existing module with the same name is
/// replaced. Returns the new locations in file-name order.
pub fn collect_modules(output_dir: &Path, modules_dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let libraries = find_libraries(output_dir)?;
    if libraries.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(modules_dir).map_err(|e| {
        DriverError::filesystem(Stage::Collect, "failed to create modules directory", modules_dir, e)
    })?;

    let mut moved = Vec::with_capacity(libraries.len());
    for source in libraries {
        // find_libraries only yields entries with a file name
        let Some(name) = source.file_name() else {
            continue;
        };
        let dest = modules_dir.join(name);
        fs::rename(&source, &dest).map_err(|e| {
            DriverError::filesystem(Stage::Collect, "failed to move module", &source, e)
        })?;
        moved.push(dest);
    }

    Ok(moved)
}

/// List dynamic libraries directly inside `dir`, sorted by file name
fn find_libraries(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let read_error = |e: io::Error| {
        DriverError::filesystem(Stage::Collect, "failed to read build output directory", dir, e)
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            terminal::print_warning(&format!(
                "build output directory {} does not exist, no modules collected",
                dir.display()
            ));
            return Ok(Vec::new());
        }
        Err(e) => return Err(read_error(e)),
    };

    let mut libraries = Vec::new();
    for entry in entries {
        let entry = entry.map_err(read_error)?;
        let file_type = entry.file_type().map_err(read_error)?;
        let path = entry.path();

        if file_type.is_file() && is_dynamic_library(&path) {
            libraries.push(path);
        }
    }

    libraries.sort();
    Ok(libraries)
}
