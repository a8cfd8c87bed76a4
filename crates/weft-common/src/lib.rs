pub mod errors;
pub mod id;
pub mod types;

pub use errors::{BridgeError, ConfigError, WeftError};
pub use id::IdAllocator;
pub use types::WindowPosition;

pub type Result<T> = std::result::Result<T, WeftError>;
