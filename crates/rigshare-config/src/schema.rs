//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Listing bounds for slot submission
    #[serde(default)]
    pub bounds: RawBounds,

    /// Demo launcher settings
    #[serde(default)]
    pub launcher: RawLauncherConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the store (default: /var/lib/rigshare)
    pub data_dir: Option<PathBuf>,

    /// Audit log file path (default: <data_dir>/execution.log)
    pub audit_log: Option<PathBuf>,

    /// Interval between expiry sweeps in serve mode, in seconds
    pub sweep_interval_seconds: Option<u64>,
}

/// Accepted ranges for seller-submitted listings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBounds {
    /// Minimum hours per slot
    pub min_hours: Option<u32>,

    /// Maximum hours per slot
    pub max_hours: Option<u32>,

    /// Minimum hourly price
    pub min_price: Option<u32>,

    /// Maximum hourly price
    pub max_price: Option<u32>,
}

/// Demo launcher settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLauncherConfig {
    /// Command to launch on a successful booking (default: ["xeyes"])
    pub argv: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bounds_section() {
        let toml_str = r#"
            config_version = 1

            [bounds]
            min_hours = 1
            max_hours = 24
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bounds.min_hours, Some(1));
        assert_eq!(config.bounds.max_hours, Some(24));
        assert_eq!(config.bounds.min_price, None);
    }

    #[test]
    fn parse_launcher_argv() {
        let toml_str = r#"
            config_version = 1

            [launcher]
            argv = ["xterm", "-e", "top"]
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.launcher.argv.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn missing_sections_default() {
        let config: RawConfig = toml::from_str("config_version = 1").unwrap();
        assert!(config.service.data_dir.is_none());
        assert!(config.launcher.argv.is_none());
    }
}
