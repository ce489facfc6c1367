//! Config validation CLI tool
//!
//! Validates a curfew configuration file and reports any errors.

use curfew_config::{FetchFailurePolicy, RetryPolicy};
use curfew_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a curfew configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match curfew_config::load_config(&config_path) {
        Ok(config) => {
            let time = &config.time;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", curfew_config::CURRENT_CONFIG_VERSION);
            println!("  Time endpoint: {}", time.endpoint);
            println!("  Refresh every: {}", format_duration(time.refresh_interval));
            println!("  Request timeout: {}", format_duration(time.request_timeout));
            match time.retry {
                RetryPolicy::Disabled => println!("  Fast retry: disabled"),
                RetryPolicy::Backoff { initial, max } => println!(
                    "  Fast retry: {} doubling up to {}",
                    format_duration(initial),
                    format_duration(max)
                ),
            }
            let failure = match time.on_fetch_failure {
                FetchFailurePolicy::Clear => "clear hour (fail closed)",
                FetchFailurePolicy::RetainLastKnown => "retain last known hour",
            };
            println!("  On fetch failure: {}", failure);

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                curfew_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                curfew_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                curfew_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                curfew_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        curfew_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
