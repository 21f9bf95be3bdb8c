//! JSON output for scripts

use super::{RenderTarget, Renderer};
use crate::{
    error::Result,
    models::{Snapshot, TestReport},
    types::Theme,
};
use serde_json::{json, Value};

/// Collects the report and prints it as one JSON document
#[derive(Debug, Default)]
pub struct JsonRenderer {
    user: Option<String>,
    theme: Theme,
    status: Option<(String, String)>,
    report: Option<TestReport>,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_value(&self) -> Value {
        let mut value = json!({
            "user": self.user,
            "theme": self.theme.as_str(),
        });

        if let Some((text, style)) = &self.status {
            value["status"] = json!({ "text": text, "style": style });
        }

        if let Some(report) = &self.report {
            value["report"] = json!({
                "profile": report.profile,
                "verdict": report.verdict,
                "label": report.verdict.label(),
                "upload_mbps": report.throughput.average_mbps,
                "stability": report.throughput.stability,
                "ping_ms": report.latency.average_ms,
                "jitter_ms": report.latency.jitter_ms,
                "latency": report.latency,
                "throughput": report.throughput,
                "started_at": report.started_at,
                "completed_at": report.completed_at,
                "elapsed_ms": report.elapsed().as_millis() as u64,
            });
        }

        value
    }
}

impl RenderTarget for JsonRenderer {
    fn set_status(&mut self, text: &str, style: &str) {
        self.status = Some((text.to_string(), style.to_string()));
    }

    fn set_user(&mut self, text: &str) {
        self.user = Some(text.to_string());
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

impl Renderer for JsonRenderer {
    fn as_target(&mut self) -> &mut dyn RenderTarget {
        self
    }

    fn record_report(&mut self, report: &TestReport) {
        self.report = Some(report.clone());
    }

    fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    fn render_snapshot(&self, snapshot: Option<&Snapshot>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({ "last": snapshot }))?)
    }
}
