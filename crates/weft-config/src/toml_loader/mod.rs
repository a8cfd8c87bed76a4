//! Locating, seeding and parsing `config.toml`.

mod loader;
mod location;
mod template;

#[cfg(test)]
mod tests;

pub use loader::{load_default, load_from_path, load_or_seed};
pub use location::{config_dir, config_path, CONFIG_DIR_ENV, CONFIG_FILE_NAME};
pub use template::seed_config;
