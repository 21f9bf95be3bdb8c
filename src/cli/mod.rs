//! Command-line interface

use crate::types::ProfileKind;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Stream Readiness Tester - checks whether a connection can carry a live stream
#[derive(Parser, Debug, Clone)]
#[command(name = "srt")]
#[command(version, long_version = crate::LONG_VERSION, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .args(["sign_in", "sign_out", "toggle_theme", "last"])
        .multiple(false)
))]
pub struct Cli {
    /// Measurement profile
    #[arg(long, value_enum)]
    pub profile: Option<ProfileKind>,

    /// Number of latency samples
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub pings: Option<u32>,

    /// Number of upload rounds
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub rounds: Option<u32>,

    /// Upload payload size in KiB
    #[arg(long, value_name = "KIB", value_parser = clap::value_parser!(u32).range(1..=65536))]
    pub payload_kb: Option<u32>,

    /// Reachability URL used for latency samples
    #[arg(long, value_name = "URL")]
    pub latency_url: Option<String>,

    /// Echo URL that receives upload payloads
    #[arg(long, value_name = "URL")]
    pub upload_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Latency recorded for a failed sample, in milliseconds
    #[arg(long, value_name = "MS")]
    pub penalty_ms: Option<u64>,

    /// Abort on the first failed latency sample
    #[arg(long)]
    pub strict: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not store this run as the last result
    #[arg(long)]
    pub no_save: bool,

    /// Preference store file
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Store a display name and exit
    #[arg(long, value_name = "NAME")]
    pub sign_in: Option<String>,

    /// Forget the display name and exit
    #[arg(long)]
    pub sign_out: bool,

    /// Switch between the dark and light theme and exit
    #[arg(long)]
    pub toggle_theme: bool,

    /// Show the last stored result and exit
    #[arg(long)]
    pub last: bool,
}

/// What one invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RunTest,
    SignIn(String),
    SignOut,
    ToggleTheme,
    ShowLast,
}

impl Action {
    /// Preference actions never touch the network
    pub fn needs_network(&self) -> bool {
        matches!(self, Action::RunTest)
    }
}

impl Cli {
    pub fn action(&self) -> Action {
        if let Some(name) = &self.sign_in {
            Action::SignIn(name.clone())
        } else if self.sign_out {
            Action::SignOut
        } else if self.toggle_theme {
            Action::ToggleTheme
        } else if self.last {
            Action::ShowLast
        } else {
            Action::RunTest
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["srt"]);
        assert_eq!(cli.profile, None);
        assert_eq!(cli.pings, None);
        assert_eq!(cli.timeout, None);
        assert!(!cli.strict);
        assert!(!cli.json);
        assert_eq!(cli.action(), Action::RunTest);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "srt",
            "--profile", "simple",
            "--pings", "12",
            "--rounds", "3",
            "--payload-kb", "256",
            "--latency-url", "https://example.com/ping",
            "--upload-url", "https://example.com/post",
            "--timeout", "10",
            "--penalty-ms", "500",
            "--strict",
            "--json",
            "--no-save",
            "--store", "/tmp/srt.json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.profile, Some(ProfileKind::Simple));
        assert_eq!(cli.pings, Some(12));
        assert_eq!(cli.rounds, Some(3));
        assert_eq!(cli.payload_kb, Some(256));
        assert_eq!(cli.latency_url.as_deref(), Some("https://example.com/ping"));
        assert_eq!(cli.upload_url.as_deref(), Some("https://example.com/post"));
        assert_eq!(cli.timeout, Some(10));
        assert_eq!(cli.penalty_ms, Some(500));
        assert!(cli.strict && cli.json && cli.no_save && cli.no_color && cli.verbose && cli.debug);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/srt.json")));
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_preference_actions() {
        assert_eq!(Cli::parse_from(["srt", "--sign-in", "Ada"]).action(), Action::SignIn("Ada".to_string()));
        assert_eq!(Cli::parse_from(["srt", "--sign-out"]).action(), Action::SignOut);
        assert_eq!(Cli::parse_from(["srt", "--toggle-theme"]).action(), Action::ToggleTheme);
        assert_eq!(Cli::parse_from(["srt", "--last"]).action(), Action::ShowLast);
        assert!(!Action::ShowLast.needs_network());
        assert!(Action::RunTest.needs_network());
    }

    #[test]
    fn test_preference_actions_conflict() {
        assert!(Cli::try_parse_from(["srt", "--sign-out", "--toggle-theme"]).is_err());
        assert!(Cli::try_parse_from(["srt", "--sign-in", "Ada", "--last"]).is_err());
    }

    #[test]
    fn test_out_of_range_counts_rejected() {
        assert!(Cli::try_parse_from(["srt", "--pings", "0"]).is_err());
        assert!(Cli::try_parse_from(["srt", "--rounds", "101"]).is_err());
        assert!(Cli::try_parse_from(["srt", "--payload-kb", "0"]).is_err());
        assert!(Cli::try_parse_from(["srt", "--profile", "turbo"]).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30"), Ok(30));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("301").is_err());
        assert!(parse_duration("+5").is_err());
        assert!(parse_duration("0x10").is_err());
        assert!(parse_duration("abc").is_err());
    }

    #[test]
    fn test_color_support_detection() {
        std::env::set_var("NO_COLOR", "1");
        assert!(!supports_color());
        std::env::remove_var("NO_COLOR");
    }
}
