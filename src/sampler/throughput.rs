//! Upload throughput sampling

use crate::{
    client::HttpClient,
    error::Result,
    logging::Logger,
    models::ThroughputResult,
    stats::{self, SampleSet},
};
use std::sync::Arc;

/// Uploads a zero-filled payload `rounds` times and rates each round in Mbps
pub struct ThroughputSampler {
    client: Arc<dyn HttpClient>,
    url: String,
    rounds: u32,
    payload_bytes: usize,
    with_stability: bool,
    logger: Arc<Logger>,
}

impl ThroughputSampler {
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>, rounds: u32, payload_bytes: usize) -> Self {
        Self {
            client,
            url: url.into(),
            rounds,
            payload_bytes,
            with_stability: rounds > 1,
            logger: Arc::new(Logger::quiet("throughput")),
        }
    }

    /// Whether the result carries a stability ratio
    pub fn with_stability(mut self, enabled: bool) -> Self {
        self.with_stability = enabled;
        self
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Rate of one upload; `None` only when the request itself fails.
    /// Any HTTP status means the payload went out, so the round is rated.
    pub async fn round(&self, index: u32, payload: &[u8]) -> Option<f64> {
        match self.client.upload(&self.url, payload).await {
            Ok(response) => {
                let rate = stats::mbps(payload.len(), response.elapsed);
                let entry = if response.is_success() {
                    self.logger.debug("upload round")
                } else {
                    self.logger.warn("upload round answered with an error status")
                };
                entry.sample(index, rate, "Mbps")
                    .field("status", response.status_code)
                    .field("elapsed_ms", response.elapsed.as_millis() as u64)
                    .log()
                    .await;
                Some(rate)
            }
            Err(e) => {
                self.logger.warn("upload round failed, counting 0 Mbps")
                    .sample(index, 0.0, "Mbps")
                    .error_info(&e)
                    .log()
                    .await;
                None
            }
        }
    }

    /// Run every round and aggregate. A failed round never aborts the run.
    pub async fn run(&self) -> Result<ThroughputResult> {
        let payload = vec![0u8; self.payload_bytes];
        let mut rates = SampleSet::with_capacity(self.rounds as usize);
        let mut failures = 0;

        for index in 0..self.rounds {
            match self.round(index, &payload).await {
                Some(rate) => rates.push(rate),
                None => {
                    failures += 1;
                    rates.push(0.0);
                }
            }
        }

        stats::summarize_throughput(&rates, failures, self.with_stability)
    }
}
