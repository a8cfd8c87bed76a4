//! Window configuration types.

use serde::{Deserialize, Serialize};

/// Initial geometry and behavior of the hosting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub maximized: bool,
    /// Enable webview devtools (always on in debug builds).
    pub devtools: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Weft".into(),
            x: 100,
            y: 100,
            width: 1280,
            height: 800,
            maximized: false,
            devtools: cfg!(debug_assertions),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
