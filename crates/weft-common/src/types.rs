use serde::{Deserialize, Serialize};

/// Outer window geometry as last reported by the window host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_maximized: bool,
}

impl WindowPosition {
    pub fn new(x: i32, y: i32, width: u32, height: u32, is_maximized: bool) -> Self {
        Self {
            x,
            y,
            width,
            height,
            is_maximized,
        }
    }

    /// Same size, new origin.
    pub fn moved_to(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Same origin, new size and maximized state.
    pub fn resized_to(self, width: u32, height: u32, is_maximized: bool) -> Self {
        Self {
            width,
            height,
            is_maximized,
            ..self
        }
    }
}
