//! Unit tests for configuration and graceful degradation
//!
//! Tests that manipulate PMO_ROOT_FOLDER are marked with #[serial]
//! so they do not race on process environment.

use pmo_common::config::{
    CompiledDefaults, ConfigOutcome, RootFolderInitializer, RootFolderResolver, TomlConfig,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults
        .root_folder
        .to_string_lossy()
        .contains("pmo"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = RootFolderResolver::new().resolve();
    assert_eq!(resolved, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_cli_arg_beats_environment() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/pmo-from-env");

    let resolved = RootFolderResolver::new()
        .with_cli_arg(Some(PathBuf::from("/tmp/pmo-from-cli")))
        .resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/pmo-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_environment_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/pmo-from-env");

    let config = TomlConfig::from_toml_str("root_folder = \"/tmp/pmo-from-toml\"").unwrap();
    let resolved = RootFolderResolver::new().with_config(config).resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/pmo-from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_beats_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig::from_toml_str("root_folder = \"/tmp/pmo-from-toml\"").unwrap();
    let resolved = RootFolderResolver::new().with_config(config).resolve();
    assert_eq!(resolved, PathBuf::from("/tmp/pmo-from-toml"));
}

#[test]
fn test_toml_defaults_fill_missing_keys() {
    let config = TomlConfig::from_toml_str("port = 8080\n[logging]\nlevel = \"debug\"").unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.tasks_file, PathBuf::from("tarefas.csv"));
    assert_eq!(config.roster_file, PathBuf::from("stacks_squads.csv"));
    assert!(config.max_upload_bytes > 0);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let path = Path::new("/nonexistent/pmo/config.toml");
    let (config, outcome) = TomlConfig::resolve(Some(path));

    assert_eq!(config.port, TomlConfig::default().port);
    assert_eq!(outcome, ConfigOutcome::Missing(path.to_path_buf()));
}

#[test]
fn test_invalid_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let (config, outcome) = TomlConfig::resolve(Some(&path));

    assert_eq!(config.port, TomlConfig::default().port);
    assert!(matches!(outcome, ConfigOutcome::Invalid(p, _) if p == path));
}

#[test]
fn test_explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 6001\ntasks_file = \"export.csv\"").unwrap();

    let (config, outcome) = TomlConfig::resolve(Some(&path));

    assert_eq!(config.port, 6001);
    assert_eq!(config.tasks_file, PathBuf::from("export.csv"));
    assert_eq!(outcome, ConfigOutcome::Loaded(path));
}

#[test]
fn test_initializer_creates_directory_and_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.exists());
    assert_eq!(initializer.database_path(), root.join("pmo.db"));
    assert!(initializer.model_file_path().starts_with(&root));
    assert_eq!(
        initializer.input_path(Path::new("tarefas.csv")),
        root.join("tarefas.csv")
    );
    assert_eq!(
        initializer.input_path(Path::new("/srv/in.csv")),
        PathBuf::from("/srv/in.csv")
    );
}
