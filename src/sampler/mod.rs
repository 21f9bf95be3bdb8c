//! Sequential latency and throughput samplers
//!
//! Both samplers issue one request at a time through [`HttpClient`] and never
//! overlap requests. What happens to a failed attempt is decided explicitly:
//! latency consults a [`FallbackPolicy`], throughput records a zero rate.
//!
//! [`HttpClient`]: crate::client::HttpClient

pub mod latency;
pub mod throughput;

pub use latency::LatencySampler;
pub use throughput::ThroughputSampler;

use crate::{
    defaults,
    error::{AppError, Result},
    models::SampleOutcome,
    types::ProfileKind,
    verdict::ThresholdTable,
};
use std::time::Duration;

/// How a failed latency attempt is turned into a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Record the given duration in place of the failed attempt
    Penalty(Duration),
    /// Abort the sampler with the attempt's error
    Propagate,
}

impl FallbackPolicy {
    /// Sample value in milliseconds for one attempt
    pub fn resolve(&self, outcome: &SampleOutcome) -> Result<f64> {
        match (outcome, self) {
            (SampleOutcome::Success(elapsed), _) => Ok(as_millis_f64(*elapsed)),
            (SampleOutcome::Failure(_), FallbackPolicy::Penalty(penalty)) => Ok(as_millis_f64(*penalty)),
            (SampleOutcome::Failure(reason), FallbackPolicy::Propagate) => {
                Err(AppError::network(format!("Latency sample failed: {}", reason)))
            }
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Penalty(defaults::DEFAULT_PENALTY)
    }
}

pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Sample counts, payload size, fallback and thresholds for one run
#[derive(Debug, Clone, PartialEq)]
pub struct TestProfile {
    pub kind: ProfileKind,
    pub ping_trials: u32,
    pub upload_rounds: u32,
    pub payload_bytes: usize,
    pub fallback: FallbackPolicy,
    pub thresholds: ThresholdTable,
}

impl TestProfile {
    /// Six pings, a single upload, no stability ratio
    pub fn simple() -> Self {
        Self {
            kind: ProfileKind::Simple,
            ping_trials: defaults::SIMPLE_PING_TRIALS,
            upload_rounds: defaults::SIMPLE_UPLOAD_ROUNDS,
            payload_bytes: defaults::DEFAULT_PAYLOAD_KB as usize * 1024,
            fallback: FallbackPolicy::default(),
            thresholds: ThresholdTable::simple(),
        }
    }

    /// Eight pings, six uploads, stability-gated thresholds
    pub fn extended() -> Self {
        Self {
            kind: ProfileKind::Extended,
            ping_trials: defaults::EXTENDED_PING_TRIALS,
            upload_rounds: defaults::EXTENDED_UPLOAD_ROUNDS,
            payload_bytes: defaults::DEFAULT_PAYLOAD_KB as usize * 1024,
            fallback: FallbackPolicy::default(),
            thresholds: ThresholdTable::extended(),
        }
    }

    pub fn reports_stability(&self) -> bool {
        self.kind == ProfileKind::Extended
    }
}

impl Default for TestProfile {
    fn default() -> Self {
        Self::extended()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted client shared by the sampler and app tests

    use crate::client::{HttpClient, HttpRequest, HttpResponse};
    use crate::error::{AppError, Result};
    use async_trait::async_trait;
    use reqwest::Method;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted reply for one request
    #[derive(Debug, Clone)]
    pub enum Reply {
        Ok { status: u16, elapsed: Duration },
        Err(String),
    }

    impl Reply {
        pub fn ok_ms(ms: u64) -> Self {
            Reply::Ok { status: 200, elapsed: Duration::from_millis(ms) }
        }

        pub fn status(status: u16, ms: u64) -> Self {
            Reply::Ok { status, elapsed: Duration::from_millis(ms) }
        }

        pub fn err(reason: &str) -> Self {
            Reply::Err(reason.to_string())
        }
    }

    /// Replays scripted probe and upload replies in order
    #[derive(Default)]
    pub struct ScriptedClient {
        probes: Mutex<VecDeque<Reply>>,
        uploads: Mutex<VecDeque<Reply>>,
        log: Mutex<Vec<(Method, usize)>>,
    }

    impl ScriptedClient {
        pub fn new(probes: Vec<Reply>, uploads: Vec<Reply>) -> Self {
            Self {
                probes: Mutex::new(probes.into()),
                uploads: Mutex::new(uploads.into()),
                log: Mutex::new(Vec::new()),
            }
        }

        /// (method, body length) of every request seen so far
        pub fn requests(&self) -> Vec<(Method, usize)> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn execute_request(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.log.lock().unwrap().push((request.method.clone(), request.body_len()));

            let queue = if request.method == Method::POST { &self.uploads } else { &self.probes };
            let reply = queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Reply::err("script exhausted"));

            match reply {
                Reply::Ok { status, elapsed } => Ok(HttpResponse {
                    status_code: status,
                    body_size: 0,
                    elapsed,
                    final_url: request.url,
                }),
                Reply::Err(reason) => Err(AppError::network(reason)),
            }
        }
    }
}
