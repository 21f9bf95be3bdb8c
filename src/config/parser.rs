//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};
use std::path::PathBuf;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli, env_file: PathBuf::from(".env") }
    }

    /// Read `.env` values from another file
    pub fn with_env_file(mut self, path: PathBuf) -> Self {
        self.env_file = path;
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        // .env only fills variables the environment does not already set
        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(profile) = cli.profile {
            config.profile = profile;
        }
        if let Some(pings) = cli.pings {
            config.ping_trials = Some(pings);
        }
        if let Some(rounds) = cli.rounds {
            config.upload_rounds = Some(rounds);
        }
        if let Some(payload_kb) = cli.payload_kb {
            config.payload_kb = payload_kb;
        }
        if let Some(url) = &cli.latency_url {
            config.latency_url = url.clone();
        }
        if let Some(url) = &cli.upload_url {
            config.upload_url = url.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(penalty) = cli.penalty_ms {
            config.penalty_ms = penalty;
        }
        if let Some(store) = &cli.store {
            config.store_path = Some(store.clone());
        }

        if cli.no_color {
            config.enable_color = false;
        }
        if cli.no_save {
            config.save = false;
        }

        config.strict |= cli.strict;
        config.json |= cli.json;
        config.verbose |= cli.verbose;
        config.debug |= cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let profile = config.test_profile();
    let mut summary = Vec::new();

    summary.push(format!("Profile: {}", profile.kind));
    summary.push(format!("Latency URL: {}", config.latency_url));
    summary.push(format!("Upload URL: {}", config.upload_url));
    summary.push(format!("Ping Trials: {}", profile.ping_trials));
    summary.push(format!("Upload Rounds: {}", profile.upload_rounds));
    summary.push(format!("Payload: {} KiB", config.payload_kb));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Failed Ping: {}", if config.strict {
        "abort".to_string()
    } else {
        format!("{}ms penalty", config.penalty_ms)
    }));
    summary.push(format!("Store: {}", config.store_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "default".to_string())));
    summary.push(format!("Save Result: {}", config.save));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
