//! Round-trip latency and jitter sampling

use super::{as_millis_f64, FallbackPolicy};
use crate::{
    client::HttpClient,
    error::Result,
    logging::Logger,
    models::{LatencyResult, SampleOutcome},
    stats::{self, SampleSet},
};
use std::sync::Arc;

/// Times `trials` sequential fetches of one reachability target
pub struct LatencySampler {
    client: Arc<dyn HttpClient>,
    url: String,
    trials: u32,
    fallback: FallbackPolicy,
    logger: Arc<Logger>,
}

impl LatencySampler {
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>, trials: u32, fallback: FallbackPolicy) -> Self {
        Self {
            client,
            url: url.into(),
            trials,
            fallback,
            logger: Arc::new(Logger::quiet("latency")),
        }
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// One attempt. Any HTTP response counts as completed, whatever its status.
    pub async fn sample_once(&self) -> SampleOutcome {
        match self.client.probe(&self.url).await {
            Ok(response) => SampleOutcome::Success(response.elapsed),
            Err(e) => SampleOutcome::Failure(e.to_string()),
        }
    }

    /// Run every trial and aggregate. Fails only under [`FallbackPolicy::Propagate`].
    pub async fn run(&self) -> Result<LatencyResult> {
        let mut samples = SampleSet::with_capacity(self.trials as usize);
        let mut failures = 0;

        for index in 0..self.trials {
            let outcome = self.sample_once().await;
            let value = self.fallback.resolve(&outcome)?;

            match &outcome {
                SampleOutcome::Success(elapsed) => {
                    self.logger.debug("latency sample")
                        .sample(index, as_millis_f64(*elapsed), "ms")
                        .log()
                        .await;
                }
                SampleOutcome::Failure(reason) => {
                    failures += 1;
                    self.logger.warn("latency sample failed, using fallback value")
                        .sample(index, value, "ms")
                        .field("reason", reason)
                        .log()
                        .await;
                }
            }

            samples.push(value);
        }

        stats::summarize_latency(&samples, failures)
    }
}
