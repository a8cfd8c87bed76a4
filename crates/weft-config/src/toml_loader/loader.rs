//! Reading `config.toml`, seeding it on first run.

use std::io;
use std::path::Path;

use tracing::{info, warn};
use weft_common::ConfigError;

use super::location::{config_dir, CONFIG_FILE_NAME};
use super::template::seed_config;
use crate::schema::WeftConfig;
use crate::validation;

/// Parse the config at `path`.
///
/// Missing fields take serde defaults. Values that fail validation are
/// still returned and only logged; [`crate::load_config_from`] rejects them.
pub fn load_from_path(path: &Path) -> Result<WeftConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("failed to read {}: {e}", path.display())),
    })?;

    let config: WeftConfig = toml::from_str(&content).map_err(|e| {
        ConfigError::ParseError(format!("{}: invalid TOML: {e}", path.display()))
    })?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "config validation warning: {e}");
    }

    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load `config.toml` from `dir`. A missing file is first seeded with the
/// commented template and the defaults are returned.
pub fn load_or_seed(dir: &Path) -> Result<WeftConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if seed_config(&path)? {
        info!(path = %path.display(), "no config found, wrote commented defaults");
        return Ok(WeftConfig::default());
    }
    load_from_path(&path)
}

/// [`load_or_seed`] in the resolved config directory.
pub fn load_default() -> Result<WeftConfig, ConfigError> {
    load_or_seed(&config_dir()?)
}
