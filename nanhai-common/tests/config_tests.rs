//! Config file and catalog file loading

use nanhai_common::config::{
    default_config_path, load_toml_config, CliOverrides, ConfigSource, ServerSettings,
    DEFAULT_PORT,
};
use nanhai_common::{ArtifactCatalog, Error};
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
port = 8080
max_connections = 2
database_path = "/srv/nanhai/game.db"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let toml = load_toml_config(Some(&path)).unwrap();
    let settings = ServerSettings::resolve(CliOverrides::default(), toml);

    assert_eq!(settings.port, 8080);
    assert_eq!(settings.max_connections, 2);
    assert_eq!(settings.database_path, PathBuf::from("/srv/nanhai/game.db"));
    assert_eq!(settings.log_level, "debug");
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let toml = load_toml_config(Some(&dir.path().join("absent.toml"))).unwrap();
    let settings = ServerSettings::resolve(CliOverrides::default(), toml);

    assert_eq!(settings.port, DEFAULT_PORT);
}

#[test]
fn test_config_source_distinguishes_missing_file() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");

    let source = ConfigSource::locate(Some(&absent));
    assert_eq!(source, ConfigSource::Missing(absent));

    // Loading never logs, so it is safe before a subscriber is installed
    let toml = source.load().unwrap();
    assert!(toml.port.is_none());
    assert!(toml.logging.level.is_none());
}

#[test]
fn test_config_source_reads_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let source = ConfigSource::locate(Some(&path));
    assert_eq!(source, ConfigSource::File(path));
    assert_eq!(source.load().unwrap().logging.level.as_deref(), Some("warn"));
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(matches!(load_toml_config(Some(&path)), Err(Error::Config(_))));
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_default_config_path_follows_xdg() {
    let dir = TempDir::new().unwrap();
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let path = default_config_path();

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    assert_eq!(path, Some(dir.path().join("nanhai").join("config.toml")));
}

#[test]
fn test_load_catalog_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.toml");
    std::fs::write(
        &path,
        r#"
[[artifacts]]
key = "bowl"
name = "Celadon Bowl"
points = 3
image = "images/bowl.png"
blurbs = ["rim", "base", "glaze", "crack"]
"#,
    )
    .unwrap();

    let catalog = ArtifactCatalog::load(&path).unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.fragment_count(), 4);
    assert_eq!(catalog.get("bowl").unwrap().blurb(4), Some("crack"));
}

#[test]
fn test_catalog_file_with_duplicate_keys_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.toml");
    let entry = r#"
[[artifacts]]
key = "bowl"
name = "Celadon Bowl"
points = 3
image = "images/bowl.png"
blurbs = ["a", "b", "c", "d"]
"#;
    std::fs::write(&path, format!("{}{}", entry, entry)).unwrap();

    assert!(ArtifactCatalog::load(&path).is_err());
}
