//! Data models and structures for the stream readiness tester

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{LatencyResult, SampleOutcome, Snapshot, TestReport, ThroughputResult};
