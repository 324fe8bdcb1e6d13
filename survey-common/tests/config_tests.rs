//! Configuration resolution tests
//!
//! Uses serial_test: tests that set SURVEY_* environment variables run one at a
//! time.

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use survey_common::config::{
    default_database_path, load_toml_config, ServerConfig, DEFAULT_BIND_ADDR,
    DEFAULT_SESSION_TTL_SECS, ENV_BIND, ENV_CONFIG, ENV_DB,
};
use std::time::Duration;
use survey_common::Error;

fn clear_env() {
    env::remove_var(ENV_DB);
    env::remove_var(ENV_BIND);
    env::remove_var(ENV_CONFIG);
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = ServerConfig::resolve(None, None, Some(&missing)).unwrap();

    assert_eq!(config.database_path, default_database_path());
    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert!(config.log_level.is_none());
    assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
}

#[test]
#[serial]
fn test_toml_values_apply() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
database_path = "/srv/survey/data.db"
bind_addr = "0.0.0.0:8080"
log_level = "debug"
session_ttl_secs = 3600
"#,
    );

    let config = ServerConfig::resolve(None, None, Some(&path)).unwrap();

    assert_eq!(config.database_path, PathBuf::from("/srv/survey/data.db"));
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.log_level.as_deref(), Some("debug"));
    assert_eq!(config.session_ttl, Duration::from_secs(3600));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "database_path = \"/from/toml.db\"\nbind_addr = \"1.1.1.1:1\"\n",
    );
    env::set_var(ENV_DB, "/from/env.db");
    env::set_var(ENV_BIND, "2.2.2.2:2");

    let config = ServerConfig::resolve(None, None, Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.database_path, PathBuf::from("/from/env.db"));
    assert_eq!(config.bind_addr, "2.2.2.2:2");
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_DB, "/from/env.db");
    env::set_var(ENV_BIND, "2.2.2.2:2");
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = ServerConfig::resolve(
        Some(Path::new("/from/cli.db")),
        Some("3.3.3.3:3"),
        Some(&missing),
    )
    .unwrap();
    clear_env();

    assert_eq!(config.database_path, PathBuf::from("/from/cli.db"));
    assert_eq!(config.bind_addr, "3.3.3.3:3");
}

#[test]
#[serial]
fn test_config_path_from_env() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "bind_addr = \"4.4.4.4:4\"\n");
    env::set_var(ENV_CONFIG, &path);

    let config = ServerConfig::resolve(None, None, None).unwrap();
    clear_env();

    assert_eq!(config.bind_addr, "4.4.4.4:4");
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "bind_addr = [not toml");

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}
