//! Where the config file lives.

use std::ffi::OsString;
use std::path::PathBuf;

use weft_common::ConfigError;

/// Overrides the config directory when set to a non-empty value.
pub const CONFIG_DIR_ENV: &str = "WEFT_CONFIG_DIR";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory holding [`CONFIG_FILE_NAME`].
///
/// `$WEFT_CONFIG_DIR` wins; otherwise `weft/` under the platform config
/// directory (`~/.config` on Linux, `~/Library/Application Support` on macOS).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    resolve_config_dir(std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir())
}

/// Full path of the config file inside [`config_dir`].
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

pub(crate) fn resolve_config_dir(
    override_dir: Option<OsString>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    platform_dir.map(|dir| dir.join("weft")).ok_or_else(|| {
        ConfigError::ParseError(format!(
            "no platform config directory; set {CONFIG_DIR_ENV}"
        ))
    })
}
