//! Path conventions for build output, modules and the packager

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::pipeline::Profile;

/// Get the target directory for build outputs
pub fn get_target_dir(root: &Path) -> PathBuf {
    root.join("target")
}

/// Get the output directory cargo uses for a profile
pub fn get_output_dir(root: &Path, profile: Profile) -> PathBuf {
    get_target_dir(root).join(profile.dir_name())
}

/// Executable file name with the host suffix (`.exe` on Windows)
pub fn executable_name(name: &str) -> String {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Check whether a path carries the host's dynamic-library extension
pub fn is_dynamic_library(path: &Path) -> bool {
    has_extension(path, std::env::consts::DLL_EXTENSION)
}

/// Case-insensitive extension match
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dirs() {
        let root = Path::new("/work");
        assert_eq!(
            get_output_dir(root, Profile::Debug),
            Path::new("/work/target/debug")
        );
        assert_eq!(
            get_output_dir(root, Profile::Release),
            Path::new("/work/target/release")
        );
    }

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension(Path::new("a.DLL"), "dll"));
        assert!(has_extension(Path::new("dir/liba.so"), "so"));
        assert!(!has_extension(Path::new("a.so.1"), "so"));
        assert!(!has_extension(Path::new("so"), "so"));
    }

    #[test]
    fn test_host_library_extension() {
        let name = format!("libmod.{}", std::env::consts::DLL_EXTENSION);
        assert!(is_dynamic_library(Path::new(&name)));
        assert!(!is_dynamic_library(Path::new("notes.txt")));
    }

    #[test]
    fn test_executable_name_appends_suffix_once() {
        let name = executable_name("purgepack");
        assert!(name.starts_with("purgepack"));
        assert_eq!(executable_name(&name), name);
    }
}
