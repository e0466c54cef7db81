//! MergeService: orchestrates sources, applies precedence, deserializes to ExportConfig.

use crate::config::sources::{environment, files};
use crate::config::ExportConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config for a working directory.
    /// Precedence: defaults (lowest) -> global file -> local file -> environment (highest).
    pub fn load(working_dir: &Path) -> Result<ExportConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = files::add_global(builder)?;
        let builder = files::add_local(builder, working_dir)?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<ExportConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = files::add_explicit(builder, path)?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }
}

/// Builder seeded with the built-in defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("export.branch", "master")?
        .set_default("export.timezone", "+0000")?
        .set_default("export.nodata", false)
}
