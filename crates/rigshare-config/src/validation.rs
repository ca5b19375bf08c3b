//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Bounds error: {0}")]
    BoundsError(String),

    #[error("Launcher error: {0}")]
    LauncherError(String),

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let min_hours = config.bounds.min_hours.unwrap_or(1);
    let max_hours = config.bounds.max_hours.unwrap_or(24);
    if min_hours == 0 {
        errors.push(ValidationError::BoundsError(
            "min_hours must be at least 1".into(),
        ));
    }
    if min_hours > max_hours {
        errors.push(ValidationError::BoundsError(format!(
            "min_hours {} exceeds max_hours {}",
            min_hours, max_hours
        )));
    }

    let min_price = config.bounds.min_price.unwrap_or(50);
    let max_price = config.bounds.max_price.unwrap_or(1000);
    if min_price == 0 {
        errors.push(ValidationError::BoundsError(
            "min_price must be at least 1".into(),
        ));
    }
    if min_price > max_price {
        errors.push(ValidationError::BoundsError(format!(
            "min_price {} exceeds max_price {}",
            min_price, max_price
        )));
    }

    if let Some(argv) = &config.launcher.argv {
        if argv.is_empty() || argv[0].is_empty() {
            errors.push(ValidationError::LauncherError(
                "argv must name a command".into(),
            ));
        }
    }

    if config.service.sweep_interval_seconds == Some(0) {
        errors.push(ValidationError::GlobalError(
            "sweep_interval_seconds must be positive".into(),
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawBounds, RawLauncherConfig, RawServiceConfig};

    fn raw_with_bounds(bounds: RawBounds) -> RawConfig {
        RawConfig {
            config_version: 1,
            service: RawServiceConfig::default(),
            bounds,
            launcher: RawLauncherConfig::default(),
        }
    }

    #[test]
    fn default_bounds_are_valid() {
        let errors = validate_config(&raw_with_bounds(RawBounds::default()));
        assert!(errors.is_empty());
    }

    #[test]
    fn zero_min_hours_rejected() {
        let errors = validate_config(&raw_with_bounds(RawBounds {
            min_hours: Some(0),
            ..Default::default()
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::BoundsError(_))));
    }

    #[test]
    fn inverted_price_bounds_rejected() {
        let errors = validate_config(&raw_with_bounds(RawBounds {
            min_price: Some(500),
            max_price: Some(100),
            ..Default::default()
        }));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn empty_launcher_argv_rejected() {
        let mut config = raw_with_bounds(RawBounds::default());
        config.launcher.argv = Some(vec![]);
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::LauncherError(_))));
    }

    #[test]
    fn zero_sweep_interval_rejected() {
        let mut config = raw_with_bounds(RawBounds::default());
        config.service.sweep_interval_seconds = Some(0);
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::GlobalError(_))));
    }
}
