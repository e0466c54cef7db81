//! Configuration
//!
//! Layered configuration: built-in defaults, the global config file, the local
//! `asset-export.toml` (or an explicit `--config` file), then `ASSET_EXPORT__*`
//! environment variables. CLI flags are applied on top by the CLI layer.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ExportError;
use crate::logging::LoggingConfig;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ExportError> {
        self.export.validate()
    }
}

/// History source selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// History manifest (`.json`, `.yaml`, `.yml` or `.toml`)
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// Checkpoint key; defaults to the name recorded in the manifest
    #[serde(default)]
    pub name: Option<String>,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_timezone() -> String {
    "+0000".to_string()
}

/// Commit stream settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Target branch under refs/heads/
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Offset written after every commit timestamp (`+HHMM` / `-HHMM`)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Write payload stubs instead of payload bytes
    #[serde(default)]
    pub nodata: bool,

    /// Checkpoint database; None means the XDG data directory
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            branch: default_branch(),
            timezone: default_timezone(),
            nodata: false,
            checkpoint_path: None,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<(), ExportError> {
        validate_branch(&self.branch)?;
        parse_timezone(&self.timezone)?;
        Ok(())
    }

    /// Checkpoint database location
    pub fn resolve_checkpoint_path(&self) -> Result<PathBuf, ExportError> {
        match &self.checkpoint_path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => xdg::checkpoint_dir(),
        }
    }
}

/// Reject branch names that would break the `commit refs/heads/<branch>` line
pub fn validate_branch(branch: &str) -> Result<(), ExportError> {
    if branch.is_empty()
        || branch.starts_with('/')
        || branch.ends_with('/')
        || branch.contains("..")
        || branch.chars().any(|c| c.is_whitespace() || c.is_control() || c == '^' || c == ':')
    {
        return Err(ExportError::ConfigError(format!(
            "Invalid branch name: {:?}",
            branch
        )));
    }
    Ok(())
}

/// Parse a `+HHMM` / `-HHMM` offset
pub fn parse_timezone(value: &str) -> Result<FixedOffset, ExportError> {
    let invalid = || {
        ExportError::ConfigError(format!(
            "Invalid timezone offset: {:?} (expected +HHMM or -HHMM)",
            value
        ))
    };
    let bytes = value.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(invalid()),
    };
    let hours: i32 = value[1..3].parse().map_err(|_| invalid())?;
    let minutes: i32 = value[3..5].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
