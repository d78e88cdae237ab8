//! purgebuild.toml parsing
//!
//! The file is optional. Every key has a default, so an empty file and a
//! missing file behave the same.
//!
//! ```toml
//! [toolchain]
//! program = "cargo"
//!
//! [packager]
//! name = "purgepack"
//!
//! [modules]
//! dir = "modules"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::validation::validate_config;

/// Default configuration file name, looked up in the invocation root
pub const CONFIG_FILE_NAME: &str = "purgebuild.toml";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub toolchain: ToolchainConfig,
    pub packager: PackagerConfig,
    pub modules: ModulesConfig,
}

/// Toolchain invoked for the build section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Program name looked up on PATH, or a path relative to the root
    pub program: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
        }
    }
}

/// Packaging executable invoked for the run section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// File name without the platform executable suffix
    pub name: String,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            name: "purgepack".to_string(),
        }
    }
}

/// Where collected libraries go
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModulesConfig {
    /// Directory relative to the build output directory
    pub dir: PathBuf,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("modules"),
        }
    }
}

impl DriverConfig {
    /// Load configuration for an invocation.
    ///
    /// An explicit path must exist. Without one, `purgebuild.toml` in `root`
    /// is used when present and defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => {
                let path = root.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::load_from_path(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse purgebuild.toml")?;
        validate_config(&config)?;
        Ok(config)
    }
}
