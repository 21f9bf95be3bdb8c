//! Main application orchestration and execution

use crate::{
    client::HttpClient,
    error::{AppError, Result},
    logging::Logger,
    models::{Config, Snapshot, TestReport},
    output::{render_report, RenderTarget, STATUS_STYLE, STATUS_TESTING},
    sampler::{LatencySampler, ThroughputSampler},
    store::{KeyValueStore, Preferences},
    types::Theme,
    verdict::classify,
};
use chrono::Utc;
use std::sync::Arc;

/// Coordinates the samplers, the classifier, the render target and the store
pub struct App<S: KeyValueStore> {
    config: Config,
    client: Option<Arc<dyn HttpClient>>,
    preferences: Preferences<S>,
    logger: Arc<Logger>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(config: Config, client: Arc<dyn HttpClient>, store: S, logger: Arc<Logger>) -> Self {
        Self {
            config,
            client: Some(client),
            preferences: Preferences::new(store),
            logger,
        }
    }

    /// App for preference actions only; `run_test` refuses to start
    pub fn offline(config: Config, store: S, logger: Arc<Logger>) -> Self {
        Self {
            config,
            client: None,
            preferences: Preferences::new(store),
            logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.preferences
    }

    /// Draw the stored user line and theme into `target`
    pub fn restore_view(&self, target: &mut dyn RenderTarget) -> Result<()> {
        target.set_user(&self.preferences.user_line()?);
        target.apply_theme(self.preferences.theme()?);
        Ok(())
    }

    /// Run latency then throughput sampling, classify, render and persist
    pub async fn run_test(&mut self, target: &mut dyn RenderTarget) -> Result<TestReport> {
        let client = self.client.clone()
            .ok_or_else(|| AppError::internal("Connection test started without an HTTP client"))?;

        self.restore_view(target)?;
        target.show_results();
        target.set_status(STATUS_TESTING, STATUS_STYLE);

        let profile = self.config.test_profile();
        let started_at = Utc::now();

        self.logger.info("Starting connection test")
            .field("profile", profile.kind.as_str())
            .field("ping_trials", profile.ping_trials)
            .field("upload_rounds", profile.upload_rounds)
            .field("payload_bytes", profile.payload_bytes)
            .log()
            .await;

        let latency = LatencySampler::new(
            client.clone(),
            self.config.latency_url.clone(),
            profile.ping_trials,
            profile.fallback,
        )
        .with_logger(self.logger.clone())
        .run()
        .await?;

        let throughput = ThroughputSampler::new(
            client,
            self.config.upload_url.clone(),
            profile.upload_rounds,
            profile.payload_bytes,
        )
        .with_stability(profile.reports_stability())
        .with_logger(self.logger.clone())
        .run()
        .await?;

        let verdict = classify(
            throughput.average_mbps,
            latency.jitter_ms,
            throughput.stability,
            &profile.thresholds,
        );

        let report = TestReport {
            profile: profile.kind,
            latency,
            throughput,
            verdict,
            started_at,
            completed_at: Utc::now(),
        };

        render_report(target, &report);

        self.logger.info("Connection test finished")
            .field("verdict", verdict.to_string())
            .field("upload_mbps", report.throughput.average_mbps)
            .field("jitter_ms", report.latency.jitter_ms)
            .field("elapsed_ms", report.elapsed().as_millis() as u64)
            .log()
            .await;

        // The verdict is already rendered; a store failure only loses the snapshot
        if self.config.save {
            if let Err(e) = self.preferences.save_snapshot(&report.snapshot()) {
                self.logger.warn("Could not store the last result")
                    .error_info(&e)
                    .log()
                    .await;
            }
        }

        Ok(report)
    }

    /// Store a display name; blank names change nothing
    pub fn sign_in(&mut self, name: &str, target: &mut dyn RenderTarget) -> Result<bool> {
        let changed = self.preferences.sign_in(name)?;
        target.set_user(&self.preferences.user_line()?);
        Ok(changed)
    }

    pub fn sign_out(&mut self, target: &mut dyn RenderTarget) -> Result<()> {
        self.preferences.sign_out()?;
        target.set_user(&self.preferences.user_line()?);
        Ok(())
    }

    pub fn toggle_theme(&mut self, target: &mut dyn RenderTarget) -> Result<Theme> {
        let theme = self.preferences.toggle_theme()?;
        target.apply_theme(theme);
        Ok(theme)
    }

    pub fn last_result(&self) -> Result<Option<Snapshot>> {
        self.preferences.last_snapshot()
    }
}
