//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::types::ProfileKind;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load a specific env file if it exists; existing variables win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();

        match key {
            "SRT_LATENCY_URL" | "SRT_UPLOAD_URL" => {
                let parsed = url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::config(format!("{} must use http or https: {}", key, value)));
                }
            }
            "SRT_PING_TRIALS" | "SRT_UPLOAD_ROUNDS" => {
                Self::check_range(key, value, 1, 100)?;
            }
            "SRT_PAYLOAD_KB" => {
                Self::check_range(key, value, 1, 65_536)?;
            }
            "SRT_TIMEOUT_SECONDS" => {
                Self::check_range(key, value, 1, 300)?;
            }
            "SRT_PENALTY_MS" => {
                Self::check_range(key, value, 1, 60_000)?;
            }
            "SRT_PROFILE" => {
                value.parse::<ProfileKind>()
                    .map_err(|e| AppError::config(format!("Invalid SRT_PROFILE value '{}': {}", value, e)))?;
            }
            "SRT_ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid SRT_ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            "SRT_STORE_PATH" => {
                if value.is_empty() {
                    return Err(AppError::config("SRT_STORE_PATH cannot be empty"));
                }
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    fn check_range(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let parsed: u64 = value.parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if parsed < min || parsed > max {
            return Err(AppError::config(format!("{} must be between {} and {}, got: {}", key, min, max, parsed)));
        }
        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SRT_LATENCY_URL", "Reachability URL for latency samples", "https://www.google.com/favicon.ico"),
            ("SRT_UPLOAD_URL", "Echo URL for upload rounds", "https://httpbin.org/post"),
            ("SRT_PROFILE", "Measurement profile (simple, extended)", "extended"),
            ("SRT_PING_TRIALS", "Number of latency samples (1-100)", "8"),
            ("SRT_UPLOAD_ROUNDS", "Number of upload rounds (1-100)", "6"),
            ("SRT_PAYLOAD_KB", "Upload payload size in KiB (1-65536)", "512"),
            ("SRT_TIMEOUT_SECONDS", "Per-request timeout in seconds (1-300)", "30"),
            ("SRT_PENALTY_MS", "Latency recorded for a failed sample (1-60000)", "300"),
            ("SRT_ENABLE_COLOR", "Enable colored output", "true"),
            ("SRT_STORE_PATH", "Preference store file", "~/.config/stream-readiness-tester/store.json"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<20} {}\n", var, description));
            help.push_str(&format!("  {:<20} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err()
            })
            .map(|e| format!("Warning: {}", e))
            .collect()
    }

    /// Check an env file's contents without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}
