use super::location::resolve_config_dir;
use super::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use weft_common::ConfigError;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_weft_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[window]
title = "Ledger"

[hot_reload]
host_pipe = "LedgerHost"
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.window.title, "Ledger");
    assert_eq!(config.hot_reload.host_pipe, "LedgerHost");
    // Defaults preserved
    assert_eq!(config.hot_reload.client_pipe, "WeftWindowClient");
    assert_eq!(config.interop.handshake_event, "RemoteInitialized");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn invalid_values_are_returned_as_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[window]
width = 5
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.window.width, 5);
}

#[test]
fn seeding_creates_directories_and_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested").join("weft");

    let config = load_or_seed(&nested).unwrap();
    assert_eq!(config.window.title, "Weft");
    assert_eq!(config.interop.call_timeout_ms, 0);

    let written = std::fs::read_to_string(nested.join(CONFIG_FILE_NAME)).unwrap();
    assert!(written.starts_with("# Weft Configuration"));
}

#[test]
fn second_load_reads_user_edits() {
    let dir = tempfile::tempdir().unwrap();
    load_or_seed(dir.path()).unwrap();

    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[window]\ntitle = \"Edited\"\n",
    )
    .unwrap();
    assert_eq!(load_or_seed(dir.path()).unwrap().window.title, "Edited");
}

#[test]
fn seed_never_overwrites_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "not toml {{{").unwrap();

    assert!(!seed_config(&path).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not toml {{{");
    assert!(matches!(
        load_or_seed(dir.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn default_template_parses_and_validates() {
    let content = template::default_config_toml();
    let config: crate::schema::WeftConfig = toml::from_str(&content).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn override_directory_wins() {
    let dir = resolve_config_dir(
        Some(OsString::from("/srv/weft-conf")),
        Some(PathBuf::from("/home/u/.config")),
    )
    .unwrap();
    assert_eq!(dir, PathBuf::from("/srv/weft-conf"));
}

#[test]
fn empty_override_falls_back_to_platform_dir() {
    let dir = resolve_config_dir(Some(OsString::new()), Some(PathBuf::from("/home/u/.config")))
        .unwrap();
    assert_eq!(dir, PathBuf::from("/home/u/.config/weft"));
}

#[test]
fn no_directory_at_all_is_an_error() {
    let err = resolve_config_dir(None, None).unwrap_err();
    assert!(err.to_string().contains(CONFIG_DIR_ENV));
}

#[test]
fn config_path_ends_with_file_name() {
    if let Ok(path) = config_path() {
        assert!(path.ends_with(CONFIG_FILE_NAME));
    }
}
