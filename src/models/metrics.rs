//! Sample outcomes, aggregated results and the persisted snapshot

use crate::types::ProfileKind;
use crate::verdict::Verdict;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one timed request attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// The request completed; start-to-completion duration
    Success(Duration),
    /// The request could not complete
    Failure(String),
}

/// Aggregated latency for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyResult {
    /// Mean latency, rounded to the nearest millisecond
    pub average_ms: u64,
    /// max - min spread, rounded to the nearest millisecond
    pub jitter_ms: u64,
    /// Samples recorded, fallbacks included
    pub samples: usize,
    /// Attempts that were replaced by the fallback value
    pub failures: usize,
}

/// Aggregated upload throughput for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputResult {
    /// Mean rate in Mbps, rounded to two decimals
    pub average_mbps: f64,
    /// round(min / avg * 100); absent for single-round runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<u8>,
    pub rounds: usize,
    /// Rounds that failed and counted as 0 Mbps
    pub failures: usize,
}

impl ThroughputResult {
    /// Average with exactly two decimals
    pub fn display_average(&self) -> String {
        format!("{:.2}", self.average_mbps)
    }
}

/// Outcome of a complete test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub profile: ProfileKind,
    pub latency: LatencyResult,
    pub throughput: ThroughputResult,
    pub verdict: Verdict,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl TestReport {
    pub fn elapsed(&self) -> Duration {
        (self.completed_at - self.started_at).to_std().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.completed_at.timestamp_millis(),
            upload: self.throughput.average_mbps,
            stability: self.throughput.stability,
            ping: self.latency.average_ms,
            jitter: self.latency.jitter_ms,
        }
    }
}

/// Last-result record kept in the preference store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Completion time, epoch milliseconds
    pub time: i64,
    pub upload: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<u8>,
    pub ping: u64,
    pub jitter: u64,
}

impl Snapshot {
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time).single()
    }
}
