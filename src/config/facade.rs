//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::ExportConfig;
use crate::error::ExportError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard files and environment, then validate.
    pub fn load(working_dir: &Path) -> Result<ExportConfig, ExportError> {
        let config = MergeService::load(working_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, then validate.
    pub fn load_from_file(path: &Path) -> Result<ExportConfig, ExportError> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> ExportConfig {
        ExportConfig::default()
    }
}
