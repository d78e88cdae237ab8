//! Driver configuration (`purgebuild.toml`)

mod purgebuild_toml;
mod validation;

pub use purgebuild_toml::DriverConfig;
