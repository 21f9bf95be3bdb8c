//! Configuration data model and validation

use crate::sampler::{FallbackPolicy, TestProfile};
use crate::types::{AppError, ProfileKind, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const MAX_TRIALS: u32 = 100;
const MAX_PAYLOAD_KB: u32 = 64 * 1024;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_PENALTY_MS: u64 = 60_000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reachability endpoint used for latency samples
    #[serde(default = "default_latency_url")]
    pub latency_url: String,

    /// Echo endpoint that receives upload payloads
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Measurement profile
    #[serde(default)]
    pub profile: ProfileKind,

    /// Latency trials; `None` takes the profile's count
    #[serde(default)]
    pub ping_trials: Option<u32>,

    /// Upload rounds; `None` takes the profile's count
    #[serde(default)]
    pub upload_rounds: Option<u32>,

    /// Upload payload size in KiB
    #[serde(default = "default_payload_kb")]
    pub payload_kb: u32,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Latency substituted for a failed attempt
    #[serde(default = "default_penalty_ms")]
    pub penalty_ms: u64,

    /// Abort on the first failed latency attempt instead of substituting
    #[serde(default)]
    pub strict: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Emit the report as JSON
    #[serde(default)]
    pub json: bool,

    /// Persist the last-result snapshot
    #[serde(default = "default_save")]
    pub save: bool,

    /// Preference store location; `None` picks the platform default
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latency_url: default_latency_url(),
            upload_url: default_upload_url(),
            profile: ProfileKind::default(),
            ping_trials: None,
            upload_rounds: None,
            payload_kb: default_payload_kb(),
            timeout_seconds: default_timeout_secs(),
            penalty_ms: default_penalty_ms(),
            strict: false,
            enable_color: default_enable_color(),
            json: false,
            save: default_save(),
            store_path: None,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Payload size in bytes
    pub fn payload_bytes(&self) -> usize {
        self.payload_kb as usize * 1024
    }

    /// Build the sampling profile, applying per-field overrides
    pub fn test_profile(&self) -> TestProfile {
        let mut profile = match self.profile {
            ProfileKind::Simple => TestProfile::simple(),
            ProfileKind::Extended => TestProfile::extended(),
        };

        if let Some(trials) = self.ping_trials {
            profile.ping_trials = trials;
        }
        if let Some(rounds) = self.upload_rounds {
            profile.upload_rounds = rounds;
        }
        profile.payload_bytes = self.payload_bytes();
        profile.fallback = if self.strict {
            FallbackPolicy::Propagate
        } else {
            FallbackPolicy::Penalty(Duration::from_millis(self.penalty_ms))
        };

        profile
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        validate_endpoint("latency URL", &self.latency_url)?;
        validate_endpoint("upload URL", &self.upload_url)?;

        if let Some(trials) = self.ping_trials {
            if trials == 0 || trials > MAX_TRIALS {
                return Err(AppError::config(format!("Ping trials must be between 1 and {}, got {}", MAX_TRIALS, trials)));
            }
        }

        if let Some(rounds) = self.upload_rounds {
            if rounds == 0 || rounds > MAX_TRIALS {
                return Err(AppError::config(format!("Upload rounds must be between 1 and {}, got {}", MAX_TRIALS, rounds)));
            }
        }

        if self.payload_kb == 0 || self.payload_kb > MAX_PAYLOAD_KB {
            return Err(AppError::config(format!("Payload size must be between 1 and {} KiB, got {}", MAX_PAYLOAD_KB, self.payload_kb)));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > MAX_TIMEOUT_SECS {
            return Err(AppError::config(format!("Timeout cannot exceed {} seconds", MAX_TIMEOUT_SECS)));
        }

        if self.penalty_ms == 0 || self.penalty_ms > MAX_PENALTY_MS {
            return Err(AppError::config(format!("Penalty must be between 1 and {} ms, got {}", MAX_PENALTY_MS, self.penalty_ms)));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("SRT_LATENCY_URL") {
            self.latency_url = url.trim().to_string();
        }

        if let Ok(url) = std::env::var("SRT_UPLOAD_URL") {
            self.upload_url = url.trim().to_string();
        }

        if let Ok(profile) = std::env::var("SRT_PROFILE") {
            self.profile = profile.parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_PROFILE value '{}': {}", profile, e)))?;
        }

        if let Ok(trials) = std::env::var("SRT_PING_TRIALS") {
            self.ping_trials = Some(trials.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_PING_TRIALS value '{}': {}", trials, e)))?);
        }

        if let Ok(rounds) = std::env::var("SRT_UPLOAD_ROUNDS") {
            self.upload_rounds = Some(rounds.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_UPLOAD_ROUNDS value '{}': {}", rounds, e)))?);
        }

        if let Ok(payload) = std::env::var("SRT_PAYLOAD_KB") {
            self.payload_kb = payload.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_PAYLOAD_KB value '{}': {}", payload, e)))?;
        }

        if let Ok(timeout) = std::env::var("SRT_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(penalty) = std::env::var("SRT_PENALTY_MS") {
            self.penalty_ms = penalty.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_PENALTY_MS value '{}': {}", penalty, e)))?;
        }

        if let Ok(enable_color) = std::env::var("SRT_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SRT_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(path) = std::env::var("SRT_STORE_PATH") {
            if !path.trim().is_empty() {
                self.store_path = Some(PathBuf::from(path.trim()));
            }
        }

        Ok(())
    }
}

fn validate_endpoint(label: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::config(format!("The {} cannot be empty", label)));
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", label, value, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(AppError::config(format!("The {} must use http or https, got '{}'", label, scheme))),
    }

    if parsed.host_str().is_none() {
        return Err(AppError::config(format!("The {} '{}' has no host", label, value)));
    }

    Ok(())
}

// Default value functions for serde
fn default_latency_url() -> String {
    crate::defaults::DEFAULT_LATENCY_URL.to_string()
}

fn default_upload_url() -> String {
    crate::defaults::DEFAULT_UPLOAD_URL.to_string()
}

fn default_payload_kb() -> u32 {
    crate::defaults::DEFAULT_PAYLOAD_KB
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_penalty_ms() -> u64 {
    crate::defaults::DEFAULT_PENALTY.as_millis() as u64
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

fn default_save() -> bool {
    true
}
