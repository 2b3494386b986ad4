//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;

    info!(
        mode = ?config.feed.mode,
        assets = config.feed.assets.len(),
        cities = config.refresh.cities.len(),
        threshold = config.alerts.threshold,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Parse and validate a config document.
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let config: AppConfig =
        toml::from_str(content).context("Failed to parse config.toml")?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
    // Feed validation
    anyhow::ensure!(
        !config.feed.assets.is_empty(),
        "At least one tracked asset must be configured"
    );

    for (i, asset) in config.feed.assets.iter().enumerate() {
        anyhow::ensure!(!asset.id.is_empty(), "Asset {} has empty id", i);
        anyhow::ensure!(
            !asset.name.is_empty(),
            "Asset {} ({}) has empty name",
            i,
            asset.id
        );
        anyhow::ensure!(
            asset.baseline > 0.0,
            "Asset {} ({}) baseline must be positive, got {}",
            i,
            asset.id,
            asset.baseline
        );
    }

    anyhow::ensure!(
        !config.feed.ws_url.is_empty(),
        "Push feed URL must not be empty"
    );
    anyhow::ensure!(
        !config.feed.rest_url.is_empty(),
        "Polling fallback URL must not be empty"
    );
    anyhow::ensure!(
        config.feed.tick_interval_secs > 0,
        "tick_interval_secs must be positive"
    );
    anyhow::ensure!(
        config.feed.poll_interval_secs > 0,
        "poll_interval_secs must be positive"
    );
    anyhow::ensure!(
        config.feed.backoff_base_ms > 0,
        "backoff_base_ms must be positive"
    );
    anyhow::ensure!(
        config.feed.backoff_multiplier >= 1.0,
        "backoff_multiplier must be >= 1.0, got {}",
        config.feed.backoff_multiplier
    );
    anyhow::ensure!(
        config.feed.max_reconnect_attempts > 0,
        "max_reconnect_attempts must be positive"
    );
    anyhow::ensure!(
        config.feed.sim_jitter_pct > 0.0 && config.feed.sim_jitter_pct < 1.0,
        "sim_jitter_pct must be in (0, 1), got {}",
        config.feed.sim_jitter_pct
    );

    // Alert validation
    anyhow::ensure!(
        config.alerts.threshold > 0.0 && config.alerts.threshold < 1.0,
        "alert threshold must be in (0, 1), got {}",
        config.alerts.threshold
    );

    // Weather simulator validation
    anyhow::ensure!(
        config.weather_alerts.min_interval_secs > 0,
        "weather min_interval_secs must be positive"
    );
    anyhow::ensure!(
        config.weather_alerts.max_interval_secs >= config.weather_alerts.min_interval_secs,
        "weather max_interval_secs ({}) must be >= min_interval_secs ({})",
        config.weather_alerts.max_interval_secs,
        config.weather_alerts.min_interval_secs
    );

    // Refresh validation
    anyhow::ensure!(
        config.refresh.interval_secs > 0,
        "refresh interval_secs must be positive"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::price_feed::FeedMode;

    const MINIMAL: &str = r#"
        [dashboard]
        name = "nexus"

        [feed]
        mode = "simulated"

        [[feed.assets]]
        id = "bitcoin"
        name = "Bitcoin"
        symbol = "BTC"
        baseline = 65000.0
    "#;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.feed.mode, FeedMode::Simulated);
        assert_eq!(config.feed.tick_interval_secs, 5);
        assert_eq!(config.feed.max_reconnect_attempts, 5);
        assert!((config.alerts.threshold - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.weather_alerts.min_interval_secs, 30);
        assert_eq!(config.weather_alerts.max_interval_secs, 60);
        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.refresh.cities.len(), 3);
    }

    #[test]
    fn empty_asset_list_is_rejected() {
        let bad = r#"
            [dashboard]
            name = "nexus"

            [feed]
            mode = "remote"
            assets = []
        "#;
        assert!(parse_config(bad).is_err());
    }

    #[test]
    fn inverted_weather_interval_is_rejected() {
        let bad = format!(
            "{MINIMAL}\n[weather_alerts]\nmin_interval_secs = 60\nmax_interval_secs = 30\n"
        );
        assert!(parse_config(&bad).is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let bad = format!("{MINIMAL}\n[alerts]\nthreshold = 1.5\n");
        assert!(parse_config(&bad).is_err());
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }
}
