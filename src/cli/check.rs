//! Configuration validation command.

use std::path::Path;

use super::output;
use super::Outcome;
use crate::config::Config;

/// Validate a configuration file without contacting the catalog.
pub fn execute_config(config_path: &Path) -> anyhow::Result<Outcome> {
    println!("Checking configuration: {}", config_path.display());

    let config = Config::load(config_path)?;
    output::ok("Configuration file is valid");

    let join = |items: Vec<String>| items.join(", ");

    output::section("Summary");
    output::key_value("API URL", &config.catalog.api_url);
    output::key_value("Page size", config.fetch.page_size);
    output::key_value(
        "Statuses",
        join(config.fetch.statuses.iter().map(ToString::to_string).collect()),
    );
    output::key_value(
        "Retries",
        format!(
            "{} attempts, {}ms backoff (cap {}ms)",
            config.fetch.retry_max_attempts,
            config.fetch.retry_backoff_ms,
            config.fetch.retry_backoff_cap_ms
        ),
    );
    output::key_value("Top K", config.ranking.top_k);
    output::key_value(
        "Metrics",
        join(config.ranking.metrics.iter().map(ToString::to_string).collect()),
    );
    output::key_value(
        "Categories",
        join(config.discovery.categories.iter().map(ToString::to_string).collect()),
    );
    output::key_value("Keywords", config.discovery.keywords.len());
    output::key_value("Concurrency", config.discovery.max_concurrent_paths);
    output::key_value(
        "Logging",
        format!("{} ({})", config.logging.level, config.logging.format),
    );

    println!();
    println!("Configuration is ready to use.");
    Ok(Outcome::Complete)
}
