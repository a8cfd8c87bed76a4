//! Configuration schema types for Weft.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod hot_reload;
mod interop;
mod logging;
mod window;

pub use hot_reload::*;
pub use interop::*;
pub use logging::*;
pub use window::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Weft.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeftConfig {
    pub window: WindowConfig,
    pub hot_reload: HotReloadConfig,
    pub interop: InteropConfig,
    pub logging: LoggingConfig,
}
