//! Config validation CLI tool
//!
//! Validates a rigshare configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-config <config-file>");
            eprintln!();
            eprintln!("Validates a rigshare configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config /etc/rigshare/config.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!(
            "Error: Configuration file not found: {}",
            config_path.display()
        );
        return ExitCode::from(1);
    }

    match rigshare_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!(
                "  Config version: {}",
                rigshare_config::CURRENT_CONFIG_VERSION
            );
            println!("  Data dir: {}", config.service.data_dir.display());
            println!("  Audit log: {}", config.service.audit_log.display());
            println!(
                "  Sweep interval: {}s",
                config.service.sweep_interval.as_secs()
            );
            println!(
                "  Hours bounds: {}..={}",
                config.bounds.min_hours, config.bounds.max_hours
            );
            println!(
                "  Price bounds: {}..={}",
                config.bounds.min_price, config.bounds.max_price
            );
            println!("  Launcher: {}", config.launcher.argv.join(" "));

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                rigshare_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                rigshare_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                rigshare_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                rigshare_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        rigshare_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
