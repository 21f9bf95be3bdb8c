//! Result presentation
//!
//! The test flow writes into a [`RenderTarget`]: a status line, numeric
//! readouts, proportional meters, the user line and the theme. Every method
//! has a no-op default, so a target without some element simply ignores the
//! write. [`TerminalRenderer`] draws a colored text report and
//! [`JsonRenderer`] emits machine-readable output.

mod json;
mod terminal;

pub use json::JsonRenderer;
pub use terminal::{ColorScheme, TerminalRenderer};

use crate::{
    defaults,
    error::Result,
    models::{Config, Snapshot, TestReport},
    types::Theme,
};
use std::fmt;

/// Status text shown while sampling is in progress
pub const STATUS_TESTING: &str = "Testing connection…";
/// Base style class of the status line
pub const STATUS_STYLE: &str = "card";

/// Numeric result fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Readout {
    Upload,
    Ping,
    Jitter,
    Stability,
}

impl Readout {
    pub fn label(&self) -> &'static str {
        match self {
            Readout::Upload => "Upload",
            Readout::Ping => "Ping",
            Readout::Jitter => "Jitter",
            Readout::Stability => "Stability",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Readout::Upload => "Mbps",
            Readout::Ping | Readout::Jitter => "ms",
            Readout::Stability => "%",
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Proportional bars, each drawn against a fixed scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Meter {
    Upload,
    Ping,
    Jitter,
}

impl Meter {
    /// Value that fills the bar completely
    pub fn scale_max(&self) -> f64 {
        match self {
            Meter::Upload => defaults::UPLOAD_METER_MAX_MBPS,
            Meter::Ping => defaults::PING_METER_MAX_MS,
            Meter::Jitter => defaults::JITTER_METER_MAX_MS,
        }
    }

    /// Readout the meter sits next to
    pub fn readout(&self) -> Readout {
        match self {
            Meter::Upload => Readout::Upload,
            Meter::Ping => Readout::Ping,
            Meter::Jitter => Readout::Jitter,
        }
    }

    pub fn width_for(&self, value: f64) -> f64 {
        meter_width(value, self.scale_max())
    }
}

/// Bar width in percent: `min(value / max, 1) * 100`, never negative.
/// A non-positive or NaN scale gives 0.
pub fn meter_width(value: f64, max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 || value.is_nan() {
        return 0.0;
    }

    (value / max).clamp(0.0, 1.0) * 100.0
}

/// Anything the test flow can draw into
pub trait RenderTarget {
    /// Reveal the results area
    fn show_results(&mut self) {}

    fn set_status(&mut self, _text: &str, _style: &str) {}

    fn set_readout(&mut self, _readout: Readout, _text: &str) {}

    /// Set a meter's width in percent
    fn set_meter(&mut self, _meter: Meter, _percent: f64) {}

    fn set_user(&mut self, _text: &str) {}

    fn apply_theme(&mut self, _theme: Theme) {}
}

/// A render target that also produces final output for the terminal
pub trait Renderer: RenderTarget {
    /// This renderer as a plain render target
    fn as_target(&mut self) -> &mut dyn RenderTarget;

    /// Keep the complete report for renderers that print it whole
    fn record_report(&mut self, _report: &TestReport) {}

    /// Final output text for stdout
    fn render(&self) -> Result<String>;

    /// Output text for a stored last-result snapshot
    fn render_snapshot(&self, snapshot: Option<&Snapshot>) -> Result<String>;
}

/// Write the classified results of a finished run into `target`
pub fn render_report(target: &mut dyn RenderTarget, report: &TestReport) {
    let verdict = report.verdict;
    target.set_status(&verdict.headline(), &format!("{} {}", STATUS_STYLE, verdict.style_tag()));

    target.set_readout(Readout::Upload, &report.throughput.display_average());
    target.set_readout(Readout::Ping, &report.latency.average_ms.to_string());
    target.set_readout(Readout::Jitter, &report.latency.jitter_ms.to_string());
    if let Some(stability) = report.throughput.stability {
        target.set_readout(Readout::Stability, &stability.to_string());
    }

    target.set_meter(Meter::Upload, Meter::Upload.width_for(report.throughput.average_mbps));
    target.set_meter(Meter::Ping, Meter::Ping.width_for(report.latency.average_ms as f64));
    target.set_meter(Meter::Jitter, Meter::Jitter.width_for(report.latency.jitter_ms as f64));
}

/// Output factory for creating the renderer a configuration asks for
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    pub fn create_renderer(config: &Config) -> Box<dyn Renderer> {
        if config.json {
            Box::new(JsonRenderer::new())
        } else {
            Box::new(TerminalRenderer::new(config.enable_color))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatencyResult, ThroughputResult};
    use crate::types::ProfileKind;
    use crate::verdict::Verdict;
    use chrono::Utc;
    use std::collections::HashMap;

    pub(super) fn sample_report(stability: Option<u8>) -> TestReport {
        let now = Utc::now();
        TestReport {
            profile: if stability.is_some() { ProfileKind::Extended } else { ProfileKind::Simple },
            latency: LatencyResult { average_ms: 93, jitter_ms: 250, samples: 6, failures: 1 },
            throughput: ThroughputResult { average_mbps: 6.47, stability, rounds: 6, failures: 1 },
            verdict: Verdict::Unsafe,
            started_at: now,
            completed_at: now,
        }
    }

    /// Only has a status line
    #[derive(Default)]
    struct StatusOnly {
        status: Option<(String, String)>,
    }

    impl RenderTarget for StatusOnly {
        fn set_status(&mut self, text: &str, style: &str) {
            self.status = Some((text.to_string(), style.to_string()));
        }
    }

    #[derive(Default)]
    struct Recorder {
        readouts: HashMap<Readout, String>,
        meters: HashMap<Meter, f64>,
    }

    impl RenderTarget for Recorder {
        fn set_readout(&mut self, readout: Readout, text: &str) {
            self.readouts.insert(readout, text.to_string());
        }

        fn set_meter(&mut self, meter: Meter, percent: f64) {
            self.meters.insert(meter, percent);
        }
    }

    #[test]
    fn test_meter_width_caps_at_full() {
        assert_eq!(meter_width(250.0, 200.0), 100.0);
        assert_eq!(meter_width(50.0, 200.0), 25.0);
        assert!((meter_width(6.47, 10.0) - 64.7).abs() < 1e-9);
    }

    #[test]
    fn test_meter_width_degenerate_inputs() {
        assert_eq!(meter_width(-5.0, 10.0), 0.0);
        assert_eq!(meter_width(5.0, 0.0), 0.0);
        assert_eq!(meter_width(5.0, -1.0), 0.0);
        assert_eq!(meter_width(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_meter_scales() {
        assert_eq!(Meter::Upload.scale_max(), 10.0);
        assert_eq!(Meter::Ping.scale_max(), 200.0);
        assert_eq!(Meter::Jitter.scale_max(), 100.0);
        assert_eq!(Meter::Jitter.readout(), Readout::Jitter);
    }

    #[test]
    fn test_target_without_elements_skips_writes() {
        let mut target = StatusOnly::default();
        render_report(&mut target, &sample_report(Some(0)));

        let (text, style) = target.status.unwrap();
        assert_eq!(text, "🔴 STREAM NOT SAFE");
        assert_eq!(style, "card bad");
    }

    #[test]
    fn test_report_readouts_and_meters() {
        let mut target = Recorder::default();
        render_report(&mut target, &sample_report(Some(0)));

        assert_eq!(target.readouts[&Readout::Upload], "6.47");
        assert_eq!(target.readouts[&Readout::Ping], "93");
        assert_eq!(target.readouts[&Readout::Jitter], "250");
        assert_eq!(target.readouts[&Readout::Stability], "0");
        assert_eq!(target.meters[&Meter::Jitter], 100.0);
        assert!((target.meters[&Meter::Ping] - 46.5).abs() < 1e-9);
    }

    #[test]
    fn test_simple_report_has_no_stability_readout() {
        let mut target = Recorder::default();
        render_report(&mut target, &sample_report(None));
        assert!(!target.readouts.contains_key(&Readout::Stability));
    }

    #[test]
    fn test_factory_honours_json_flag() {
        let mut config = Config::default();
        config.json = true;
        let renderer = OutputFormatterFactory::create_renderer(&config);
        let output = renderer.render().unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&output).is_ok());
    }
}
