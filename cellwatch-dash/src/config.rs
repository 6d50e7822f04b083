use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use cellwatch_core::{AlertThresholds, MAX_CELLS};
use serde::Deserialize;
use thiserror::Error;

/// Accepted voltage alert thresholds, in volts.
pub const VOLTAGE_THRESHOLD_RANGE: RangeInclusive<f64> = 2.0..=5.0;
/// Accepted temperature alert thresholds, in degrees Celsius.
pub const TEMP_THRESHOLD_RANGE: RangeInclusive<f64> = 20.0..=100.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("num_cells must be between 1 and 20, got {0}")]
    CellCount(usize),

    #[error("voltage_threshold must be between 2.0 and 5.0 V, got {0}")]
    VoltageThreshold(f64),

    #[error("temp_threshold must be between 20 and 100 °C, got {0}")]
    TempThreshold(f64),

    #[error("refresh_interval_secs must be greater than zero")]
    RefreshInterval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Number of monitored cells, 1 to 20.
    pub num_cells: usize,
    /// Voltage alert threshold in volts.
    pub voltage_threshold: f64,
    /// Temperature alert threshold in degrees Celsius.
    pub temp_threshold: f64,
    /// Run a refresh cycle on every scheduler tick.
    #[serde(default)]
    pub auto_refresh: bool,
    /// Seconds between auto refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address for the HTTP server to listen on
    pub http_addr: SocketAddr,
}

/// Where each refresh cycle gets its readings from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedConfig {
    /// Operator-entered values from the input panel.
    #[default]
    Manual,
    /// Simulated sensor feed.
    Mock {
        /// Fixed seed for a reproducible feed.
        seed: Option<u64>,
    },
}

impl DashboardConfig {
    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            voltage: self.voltage_threshold,
            temperature: self.temp_threshold,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CELLS).contains(&self.num_cells) {
            return Err(ConfigError::CellCount(self.num_cells));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::RefreshInterval);
        }
        validate_thresholds(&self.thresholds())
    }
}

/// Check alert thresholds against the ranges the dashboard accepts.
pub fn validate_thresholds(thresholds: &AlertThresholds) -> Result<(), ConfigError> {
    if !VOLTAGE_THRESHOLD_RANGE.contains(&thresholds.voltage) {
        return Err(ConfigError::VoltageThreshold(thresholds.voltage));
    }
    if !TEMP_THRESHOLD_RANGE.contains(&thresholds.temperature) {
        return Err(ConfigError::TempThreshold(thresholds.temperature));
    }
    Ok(())
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.dashboard.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig {
                num_cells: 8,
                voltage_threshold: 3.5,
                temp_threshold: 60.0,
                auto_refresh: false,
                refresh_interval_secs: default_refresh_interval_secs(),
            },
            server: ServerConfig {
                http_addr: SocketAddr::from(([0, 0, 0, 0], 8501)),
            },
            feed: FeedConfig::Manual,
        }
    }
}
