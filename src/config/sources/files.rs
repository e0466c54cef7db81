//! Config file sources: the global XDG file and the local `asset-export.toml`.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Local config file name, looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "asset-export.toml";

/// Add the global config file if present.
pub fn add_global(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::global_config_file() {
        Some(path) => Ok(builder.add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )),
        None => Ok(builder),
    }
}

/// Add `<dir>/asset-export.toml` if present.
pub fn add_local(
    builder: ConfigBuilder<DefaultState>,
    dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        File::from(dir.join(LOCAL_CONFIG_FILE))
            .format(FileFormat::Toml)
            .required(false),
    ))
}

/// Add an explicit config file; it must exist.
pub fn add_explicit(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(File::from(path.to_path_buf()).required(true)))
}
