//! Validated configuration structures

use crate::schema::RawConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Validated configuration ready for use by the service
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Service paths and intervals
    pub service: ServiceConfig,

    /// Accepted ranges for seller-submitted listings
    pub bounds: ListingBounds,

    /// Demo launcher command
    pub launcher: LauncherConfig,
}

impl MarketConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            bounds: ListingBounds::from_raw(raw.bounds),
            launcher: LauncherConfig::from_raw(raw.launcher),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            bounds: ListingBounds::default(),
            launcher: LauncherConfig::default(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub audit_log: PathBuf,
    pub sweep_interval: Duration,
}

impl ServiceConfig {
    fn from_raw(raw: crate::schema::RawServiceConfig) -> Self {
        let data_dir = raw
            .data_dir
            .unwrap_or_else(|| PathBuf::from("/var/lib/rigshare"));
        let audit_log = raw
            .audit_log
            .unwrap_or_else(|| data_dir.join("execution.log"));
        Self {
            data_dir,
            audit_log,
            sweep_interval: Duration::from_secs(raw.sweep_interval_seconds.unwrap_or(5)),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(crate::schema::RawServiceConfig::default())
    }
}

/// Accepted ranges for hours and price on a submitted slot.
///
/// The reference configuration is hours in [1,24] and price in [50,1000];
/// both are configuration, not a hard law.
#[derive(Debug, Clone, Copy)]
pub struct ListingBounds {
    pub min_hours: u32,
    pub max_hours: u32,
    pub min_price: u32,
    pub max_price: u32,
}

impl ListingBounds {
    fn from_raw(raw: crate::schema::RawBounds) -> Self {
        Self {
            min_hours: raw.min_hours.unwrap_or(1),
            max_hours: raw.max_hours.unwrap_or(24),
            min_price: raw.min_price.unwrap_or(50),
            max_price: raw.max_price.unwrap_or(1000),
        }
    }

    pub fn contains_hours(&self, hours: u32) -> bool {
        (self.min_hours..=self.max_hours).contains(&hours)
    }

    pub fn contains_price(&self, price: u32) -> bool {
        (self.min_price..=self.max_price).contains(&price)
    }
}

impl Default for ListingBounds {
    fn default() -> Self {
        Self::from_raw(crate::schema::RawBounds::default())
    }
}

/// Demo launcher configuration
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Command and arguments for the demonstration process
    pub argv: Vec<String>,
}

impl LauncherConfig {
    fn from_raw(raw: crate::schema::RawLauncherConfig) -> Self {
        Self {
            argv: raw.argv.unwrap_or_else(|| vec!["xeyes".to_string()]),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::from_raw(crate::schema::RawLauncherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_log_defaults_under_data_dir() {
        let config = MarketConfig::default();
        assert_eq!(
            config.service.audit_log,
            config.service.data_dir.join("execution.log")
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = ListingBounds::default();
        assert!(bounds.contains_hours(1));
        assert!(bounds.contains_hours(24));
        assert!(!bounds.contains_hours(25));
        assert!(bounds.contains_price(50));
        assert!(bounds.contains_price(1000));
        assert!(!bounds.contains_price(1001));
    }
}
