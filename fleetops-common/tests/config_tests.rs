//! Configuration loading and override priority
//!
//! Uses serial_test: these tests modify FLEETOPS_* environment variables and
//! must not run in parallel with each other.

use fleetops_common::config::{
    TomlConfig, ENV_CONFIG_PATH, ENV_DATABASE, ENV_LOCALE, ENV_PORT, ENV_STORE_TOKEN,
    ENV_STORE_URL,
};
use fleetops_common::{Error, Locale};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

fn clear_env() {
    for var in [
        ENV_CONFIG_PATH,
        ENV_STORE_URL,
        ENV_STORE_TOKEN,
        ENV_LOCALE,
        ENV_PORT,
        ENV_DATABASE,
    ] {
        env::remove_var(var);
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
#[serial]
fn test_load_explicit_file() {
    clear_env();
    let file = write_config(
        r#"
        database_path = "/tmp/fleetops-test.db"

        [server]
        port = 6100

        [store]
        base_url = "https://fleet.example.co"
        access_token = "file-token"

        [import]
        locale = "en"
        max_in_flight = 4
        upsert = true
        "#,
    );

    let config = TomlConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.server.port, 6100);
    assert_eq!(config.store.base_url, "https://fleet.example.co");
    assert_eq!(config.require_access_token().unwrap(), "file-token");
    assert_eq!(config.import.locale, Locale::En);
    assert_eq!(config.import.max_in_flight, 4);
    assert!(config.import.upsert);
    assert_eq!(config.database_path(), PathBuf::from("/tmp/fleetops-test.db"));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = write_config(
        r#"
        [store]
        base_url = "https://file.example.co"
        access_token = "file-token"
        "#,
    );

    env::set_var(ENV_STORE_URL, "https://env.example.co");
    env::set_var(ENV_STORE_TOKEN, "env-token");
    env::set_var(ENV_LOCALE, "en-US");
    env::set_var(ENV_PORT, "7000");

    let config = TomlConfig::load(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.store.base_url, "https://env.example.co");
    assert_eq!(config.require_access_token().unwrap(), "env-token");
    assert_eq!(config.import.locale, Locale::En);
    assert_eq!(config.server.port, 7000);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env();
    let result = TomlConfig::load(Some(std::path::Path::new(
        "/nonexistent/fleetops/config.toml",
    )));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_config_env_var_selects_file() {
    clear_env();
    let file = write_config(
        r#"
        [import]
        detailed_errors = true
        "#,
    );
    env::set_var(ENV_CONFIG_PATH, file.path());

    let config = TomlConfig::load(None).unwrap();
    clear_env();

    assert!(config.import.detailed_errors);
}

#[test]
#[serial]
fn test_invalid_port_env_is_error() {
    clear_env();
    let file = write_config("");
    env::set_var(ENV_PORT, "not-a-port");

    let result = TomlConfig::load(Some(file.path()));
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_malformed_toml_is_error() {
    clear_env();
    let file = write_config("[store\nbase_url = ");
    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
