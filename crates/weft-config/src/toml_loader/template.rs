//! The commented config written on first run.

use std::io::{self, Write};
use std::path::Path;

use weft_common::ConfigError;

/// Write the template to `path` unless a file is already there.
///
/// Returns whether the file was created. Missing parent directories are
/// created. An existing file is never touched, even if it fails to parse.
pub fn seed_config(path: &Path) -> Result<bool, ConfigError> {
    let write_error =
        |e: io::Error| ConfigError::ParseError(format!("failed to seed {}: {e}", path.display()));

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(write_error(e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(write_error)?;
    Ok(true)
}

pub(crate) fn default_config_toml() -> String {
    r##"# Weft Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# Point WEFT_CONFIG_DIR at another directory to use a different config.toml.

[window]
# title = "Weft"
# x = 100
# y = 100
# width = 1280             # 200-16384
# height = 800             # 200-16384
# maximized = false
# devtools = false

[hot_reload]
# pipe_dir = ""            # empty = OS temp directory
# host_pipe = "WeftWindowHost"
# client_pipe = "WeftWindowClient"
# connect_retry_ms = 50    # 1-5000

[interop]
# call_timeout_ms = 0      # 0 = calls never time out
# handshake_event = "RemoteInitialized"

[logging]
# level = "info"           # trace, debug, info, warn, error
"##
    .to_string()
}
