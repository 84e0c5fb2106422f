use std::io::Write;

use catalog_scout::config::Config;
use catalog_scout::domain::{CatalogCategory, EntryStatus, Metric};
use catalog_scout::error::{ConfigError, Error};
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn full_config_loads_from_file() {
    let file = write_temp_config(
        r#"
[catalog]
api_url = "https://demo-api.kalshi.co/trade-api/v2"

[catalog.http]
timeout_ms = 2500

[fetch]
page_size = 500
statuses = ["open", "closed"]
retry_max_attempts = 5
retry_backoff_ms = 100
retry_backoff_cap_ms = 1600

[ranking]
top_k = 50
metrics = ["volume-24h", "liquidity"]

[discovery]
categories = ["sports", "Climate and Weather"]
keywords = ["NFL"]
max_concurrent_paths = 8

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(file.path()).expect("load config");

    assert_eq!(config.catalog.http.timeout_ms, 2500);
    assert_eq!(config.catalog.http.connect_timeout_ms, 3000);
    assert_eq!(config.fetch.page_size, 500);
    assert_eq!(
        config.fetch.statuses,
        vec![EntryStatus::Open, EntryStatus::Closed]
    );
    assert_eq!(config.fetch.retry_max_attempts, 5);
    assert_eq!(config.ranking.metrics, vec![Metric::Volume24h, Metric::Liquidity]);
    assert_eq!(
        config.discovery.categories,
        vec![CatalogCategory::Sports, CatalogCategory::ClimateAndWeather]
    );
    assert_eq!(config.discovery.max_concurrent_paths, 8);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = Config::load(dir.path().join("absent.toml"));

    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn unknown_metric_is_rejected() {
    let file = write_temp_config("[ranking]\nmetrics = [\"popularity\"]\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::Parse(err))) => {
            assert!(err.to_string().contains("popularity"), "unexpected error: {err}");
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn unknown_status_is_rejected() {
    let file = write_temp_config("[fetch]\nstatuses = [\"pending\"]\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn zero_concurrency_is_rejected() {
    let file = write_temp_config("[discovery]\nmax_concurrent_paths = 0\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "max_concurrent_paths");
        }
        other => panic!("Expected invalid concurrency, got {other:?}"),
    }
}

#[test]
fn zero_retry_attempts_are_rejected() {
    let file = write_temp_config("[fetch]\nretry_max_attempts = 0\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "retry_max_attempts",
            ..
        }))
    ));
}
