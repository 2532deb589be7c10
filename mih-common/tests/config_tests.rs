//! Tests for configuration loading and root folder resolution
//!
//! Tests that touch MIH_ROOT_FOLDER are marked #[serial] so they do not race
//! each other on the process environment.

use mih_common::config::{
    load_toml_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/mih-env-root");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/mih-toml-root")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(root_folder, PathBuf::from("/tmp/mih-env-root"));
}

#[test]
#[serial]
fn test_resolver_cli_beats_everything() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/mih-env-root");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/mih-toml-root")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .with_cli_arg(Some(PathBuf::from("/tmp/mih-cli-root")))
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(root_folder, PathBuf::from("/tmp/mih-cli-root"));
}

#[test]
#[serial]
fn test_resolver_toml_when_no_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/mih-toml-root")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/mih-toml-root"));
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_toml_config(&temp_dir.path().join("absent.toml")).unwrap();

    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "root_folder = [not toml").unwrap();

    let result = load_toml_config(&path);
    assert!(result.is_err());
}

#[test]
fn test_initializer_creates_root_folder() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("a").join("b");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(init.database_path(), root.join("music_insights.db"));
}
