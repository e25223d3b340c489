//! Configuration loading and validation tests

use psb_infrastructure::config::ConfigLoader;
use psb_infrastructure::config::types::BrokerProvider;
use psb_domain::messages::DeliveryMode;
use std::io::Write;
use tempfile::NamedTempFile;

fn loader_for(contents: &str) -> (ConfigLoader, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    // An unused prefix keeps ambient PSB_* variables out of the test
    let loader = ConfigLoader::new()
        .with_config_path(file.path())
        .with_env_prefix("PSB_TEST_UNSET");
    (loader, file)
}

#[test]
fn test_defaults_load_and_validate() {
    let (loader, _file) = loader_for("");
    let config = loader.load().unwrap();

    assert_eq!(config.broker.provider, BrokerProvider::Nats);
    assert!(config.broker.nats_url.is_some());
    assert_eq!(config.subscriber.delivery_mode, DeliveryMode::Synchronous);
    assert_eq!(config.subscriber.concurrency, 4);
    assert_eq!(config.subscriber.max_outstanding, 10);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json_format);
}

#[test]
fn test_toml_overrides_defaults() {
    let (loader, _file) = loader_for(
        r#"
[broker]
provider = "memory"
connection_timeout_ms = 1500

[subscriber]
delivery_mode = "streaming"
concurrency = 8
max_outstanding = 64
expiration_days = 30

[logging]
level = "debug"
json_format = true
"#,
    );
    let config = loader.load().unwrap();

    assert_eq!(config.broker.provider, BrokerProvider::Memory);
    assert_eq!(config.broker.connection_timeout_ms, 1500);
    assert_eq!(config.subscriber.delivery_mode, DeliveryMode::Streaming);
    assert_eq!(config.subscriber.concurrency, 8);
    assert_eq!(config.subscriber.max_outstanding, 64);
    assert_eq!(config.subscriber.expiration_days, 30);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json_format);
}

#[test]
fn test_zero_concurrency_rejected() {
    let (loader, _file) = loader_for("[subscriber]\nconcurrency = 0\n");
    assert!(loader.load().is_err());
}

#[test]
fn test_zero_max_outstanding_rejected() {
    let (loader, _file) = loader_for("[subscriber]\nmax_outstanding = 0\n");
    assert!(loader.load().is_err());
}

#[test]
fn test_zero_connection_timeout_rejected() {
    let (loader, _file) = loader_for("[broker]\nconnection_timeout_ms = 0\n");
    assert!(loader.load().is_err());
}

#[test]
fn test_nats_provider_requires_url() {
    let (loader, _file) = loader_for("[broker]\nprovider = \"nats\"\nnats_url = \"\"\n");
    assert!(loader.load().is_err());
}

#[test]
fn test_invalid_log_level_rejected() {
    let (loader, _file) = loader_for("[logging]\nlevel = \"loud\"\n");
    assert!(loader.load().is_err());
}

#[test]
fn test_save_and_reload_round_trip() {
    let (loader, _file) = loader_for("[subscriber]\nconcurrency = 2\n");
    let config = loader.load().unwrap();

    let out = NamedTempFile::new().unwrap();
    loader.save_to_file(&config, out.path()).unwrap();

    let reloaded = ConfigLoader::new()
        .with_config_path(out.path())
        .with_env_prefix("PSB_TEST_UNSET")
        .load()
        .unwrap();
    assert_eq!(reloaded.subscriber.concurrency, 2);
}
