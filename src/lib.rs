//! Stream Readiness Tester
//!
//! Estimates whether an internet connection can carry a live stream. Latency
//! and jitter are sampled against a reachability endpoint, upload throughput
//! against an echo endpoint, and the two are folded into a three-tier verdict.

pub mod app;
pub mod cli;
pub mod config;
pub mod client;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod sampler;
pub mod stats;
pub mod store;
pub mod types;
pub mod verdict;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, LatencyResult, SampleOutcome, Snapshot, ThroughputResult};
pub use sampler::{FallbackPolicy, LatencySampler, TestProfile, ThroughputSampler};
pub use verdict::{classify, ThresholdTable, Verdict};
pub use output::{RenderTarget, TerminalRenderer, JsonRenderer};
pub use store::{KeyValueStore, FileStore, MemoryStore, Preferences};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Version line with build metadata, shown by `--version` and in debug mode
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT"),
    ", ",
    env!("TARGET_TRIPLE"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_LATENCY_URL: &str = "https://www.google.com/favicon.ico";
    pub const DEFAULT_UPLOAD_URL: &str = "https://httpbin.org/post";

    pub const EXTENDED_PING_TRIALS: u32 = 8;
    pub const SIMPLE_PING_TRIALS: u32 = 6;
    pub const EXTENDED_UPLOAD_ROUNDS: u32 = 6;
    pub const SIMPLE_UPLOAD_ROUNDS: u32 = 1;

    /// 512 KiB upload payload
    pub const DEFAULT_PAYLOAD_KB: u32 = 512;
    pub const DEFAULT_PENALTY: Duration = Duration::from_millis(300);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Meter scale maxima
    pub const UPLOAD_METER_MAX_MBPS: f64 = 10.0;
    pub const PING_METER_MAX_MS: f64 = 200.0;
    pub const JITTER_METER_MAX_MS: f64 = 100.0;
}
