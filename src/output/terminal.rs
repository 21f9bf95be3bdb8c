//! Colored terminal report
//!
//! Records every element the test flow writes and draws them as a text
//! report with ANSI colors and block-character meters.

use super::{Meter, Readout, RenderTarget, Renderer};
use crate::{
    error::{AppError, Result},
    models::Snapshot,
    types::Theme,
};
use chrono::Local;
use colored::*;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 20;
const TITLE: &str = "📡 Stream Readiness Test";

/// Color scheme configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub border: Color,
}

impl ColorScheme {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                header: Color::BrightBlue,
                success: Color::BrightGreen,
                warning: Color::BrightYellow,
                error: Color::BrightRed,
                info: Color::BrightCyan,
                muted: Color::BrightBlack,
                border: Color::BrightBlack,
            },
            Theme::Light => Self {
                header: Color::Blue,
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
                info: Color::Cyan,
                muted: Color::Black,
                border: Color::Black,
            },
        }
    }

    /// Color for a status style such as `card safe`
    pub fn for_style(&self, style: &str) -> Color {
        match style.split_whitespace().last() {
            Some("safe") => self.success,
            Some("risky") => self.warning,
            Some("bad") => self.error,
            _ => self.info,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}

/// Terminal render target
pub struct TerminalRenderer {
    use_color: bool,
    theme: Theme,
    color_scheme: ColorScheme,
    results_visible: bool,
    status: Option<(String, String)>,
    readouts: BTreeMap<Readout, String>,
    meters: BTreeMap<Meter, f64>,
    user: Option<String>,
}

impl TerminalRenderer {
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            theme: Theme::default(),
            color_scheme: ColorScheme::default(),
            results_visible: false,
            status: None,
            readouts: BTreeMap::new(),
            meters: BTreeMap::new(),
            user: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn status(&self) -> Option<(&str, &str)> {
        self.status.as_ref().map(|(text, style)| (text.as_str(), style.as_str()))
    }

    pub fn readout(&self, readout: Readout) -> Option<&str> {
        self.readouts.get(&readout).map(String::as_str)
    }

    pub fn meter(&self, meter: Meter) -> Option<f64> {
        self.meters.get(&meter).copied()
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.use_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.use_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored if colors are enabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.use_color {
            text.bold().color(color)
        } else {
            text.normal()
        }
    }

    /// Block bar for a width in percent
    fn create_meter_bar(&self, percent: f64) -> String {
        let filled = ((percent / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
        let empty = BAR_WIDTH - filled;

        if !self.use_color {
            return format!("[{}{}]", "#".repeat(filled), "-".repeat(empty));
        }

        let color = if percent >= 100.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.info
        };

        format!("[{}{}]",
            "█".repeat(filled).color(color),
            "░".repeat(empty).color(self.color_scheme.muted))
    }

    fn format_header(&self, output: &mut String) -> Result<()> {
        let border = "═".repeat(TITLE.chars().count() + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border)).map_err(format_error)?;
        writeln!(output, "  {}", self.emphasize(TITLE, self.color_scheme.header)).map_err(format_error)?;
        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border)).map_err(format_error)?;
        Ok(())
    }

    fn format_results(&self, output: &mut String) -> Result<()> {
        writeln!(output).map_err(format_error)?;

        if let Some((text, style)) = &self.status {
            let color = self.color_scheme.for_style(style);
            writeln!(output, "{}", self.emphasize(text, color)).map_err(format_error)?;
            writeln!(output).map_err(format_error)?;
        }

        for (readout, value) in &self.readouts {
            let label = format!("{:<10}", readout.label());
            let value = format!("{:>8} {:<4}", value, readout.unit());
            let meter = self.meters.iter()
                .find(|(meter, _)| meter.readout() == *readout)
                .map(|(_, percent)| format!("  {} {:>5.1}%", self.create_meter_bar(*percent), percent))
                .unwrap_or_default();

            writeln!(output, "{} {}{}", self.colorize(&label, self.color_scheme.muted), self.bold(&value), meter)
                .map_err(format_error)?;
        }

        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

fn format_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

impl RenderTarget for TerminalRenderer {
    fn show_results(&mut self) {
        self.results_visible = true;
    }

    fn set_status(&mut self, text: &str, style: &str) {
        self.status = Some((text.to_string(), style.to_string()));
    }

    fn set_readout(&mut self, readout: Readout, text: &str) {
        self.readouts.insert(readout, text.to_string());
    }

    fn set_meter(&mut self, meter: Meter, percent: f64) {
        self.meters.insert(meter, percent);
    }

    fn set_user(&mut self, text: &str) {
        self.user = Some(text.to_string());
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.color_scheme = ColorScheme::for_theme(theme);
    }
}

impl Renderer for TerminalRenderer {
    fn as_target(&mut self) -> &mut dyn RenderTarget {
        self
    }

    fn render(&self) -> Result<String> {
        let mut output = String::new();
        self.format_header(&mut output)?;

        if let Some(user) = &self.user {
            writeln!(output, "👤 {}", self.colorize(user, self.color_scheme.info)).map_err(format_error)?;
        }

        if self.results_visible {
            self.format_results(&mut output)?;
        }

        Ok(output)
    }

    fn render_snapshot(&self, snapshot: Option<&Snapshot>) -> Result<String> {
        let mut output = String::new();

        let Some(snapshot) = snapshot else {
            writeln!(output, "{}", self.colorize("No previous result stored.", self.color_scheme.muted))
                .map_err(format_error)?;
            return Ok(output);
        };

        let when = snapshot.recorded_at()
            .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown time".to_string());

        writeln!(output, "{} {}", self.bold("Last result:"), self.colorize(&when, self.color_scheme.muted))
            .map_err(format_error)?;
        writeln!(output, "  Upload     {:.2} Mbps", snapshot.upload).map_err(format_error)?;
        if let Some(stability) = snapshot.stability {
            writeln!(output, "  Stability  {} %", stability).map_err(format_error)?;
        }
        writeln!(output, "  Ping       {} ms", snapshot.ping).map_err(format_error)?;
        writeln!(output, "  Jitter     {} ms", snapshot.jitter).map_err(format_error)?;

        Ok(output)
    }
}
