//! Full configuration validation.
//!
//! Each section validator pushes its problems into a shared list; the
//! orchestrator joins them into a single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::WeftConfig;
use weft_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &WeftConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_window(&mut errors, config);
    sections::validate_hot_reload(&mut errors, config);
    sections::validate_interop(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
