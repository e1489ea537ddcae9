//! Configuration file support.
//!
//! Loads and validates the fabric database configuration from TOML.
//!
//! ```toml
//! [zone_check]
//! max_zone_participation = 24
//! multi_initiator = false
//!
//! [alerts.overrides.ZONE_NOT_FOUND]
//! severity = "warn"
//!
//! [logging]
//! level = "debug"
//! ```

use crate::alert::{AlertOverride, AlertTable};
use crate::error::{FcdbError, FcdbResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Zone analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCheckConfig {
    /// Maximum number of devices effectively zoned to one target
    #[serde(default = "default_max_zone_participation")]
    pub max_zone_participation: usize,

    /// Suggest an alias when a zone names a WWN that has one
    #[serde(default = "default_true")]
    pub zone_alias_use: bool,

    /// Flag zones mixing WWN and alias members
    #[serde(default = "default_true")]
    pub wwn_alias_zone: bool,

    /// Flag zones with more than one initiator
    #[serde(default = "default_true")]
    pub multi_initiator: bool,

    /// Compare effective zones with their defined zones
    #[serde(default = "default_true")]
    pub zone_mismatch: bool,

    /// Flag peer property members in zone definitions
    #[serde(default = "default_true")]
    pub peer_property: bool,

    /// Check speed differences of devices zoned to the same target
    #[serde(default = "default_true")]
    pub speed_check: bool,

    /// Check that each CHPID shares a zone with the ports of its link addresses
    #[serde(default = "default_true")]
    pub ficon_zoning: bool,
}

/// Alert table configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Per code overrides keyed by alert name, e.g. `ZONE_NOT_FOUND`
    #[serde(default)]
    pub overrides: HashMap<String, AlertOverride>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON formatted log lines
    #[serde(default)]
    pub json: bool,
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FcdbConfig {
    #[serde(default)]
    pub zone_check: ZoneCheckConfig,

    #[serde(default)]
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_max_zone_participation() -> usize {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ZoneCheckConfig {
    fn default() -> Self {
        Self {
            max_zone_participation: default_max_zone_participation(),
            zone_alias_use: default_true(),
            wwn_alias_zone: default_true(),
            multi_initiator: default_true(),
            zone_mismatch: default_true(),
            peer_property: default_true(),
            speed_check: default_true(),
            ficon_zoning: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl FcdbConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> FcdbResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from file.
    pub fn load(path: impl AsRef<Path>) -> FcdbResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| FcdbError::io(path, e))?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads configuration from file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> FcdbResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> FcdbResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| FcdbError::invalid_config("config", e.to_string()))?;
        fs::write(path, content).map_err(|e| FcdbError::io(path, e))
    }

    /// Validates configuration.
    pub fn validate(&self) -> FcdbResult<()> {
        if self.zone_check.max_zone_participation == 0 {
            return Err(FcdbError::invalid_config(
                "zone_check.max_zone_participation",
                "must be > 0",
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(FcdbError::invalid_config(
                "logging.level",
                format!("must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        self.alert_table().map(|_| ())
    }

    /// Built-in alert table with the configured overrides applied.
    pub fn alert_table(&self) -> FcdbResult<AlertTable> {
        AlertTable::with_overrides(&self.alerts.overrides).map_err(|e| {
            FcdbError::invalid_config("alerts.overrides", e.to_string())
        })
    }
}
