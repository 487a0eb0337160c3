//! Command-line interface

use crate::logging::{LogFormat, LogLevel};
use crate::types::BusyPolicy;
use clap::Parser;
use std::path::PathBuf;

/// Prometheus exporter running an internet speedtest on every probe
///
/// Options left unset fall back to environment variables (or a `.env`
/// file), then to built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "prometheus_speedtest")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, value_name = "IP")]
    pub address: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Speedtest server id to test against (auto-selected if omitted)
    #[arg(short, long = "server", value_name = "ID")]
    pub server_id: Option<u32>,

    /// Local address the measurement binds to
    #[arg(long, value_name = "IP")]
    pub source_address: Option<String>,

    /// Measurement timeout in seconds
    #[arg(short, long, value_parser = parse_duration, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Command launching the speedtest tool
    #[arg(long, value_name = "COMMAND")]
    pub speedtest_command: Option<String>,

    /// Directory served for paths other than /probe
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// What a probe does while another measurement runs (queue, reject)
    #[arg(long, value_name = "POLICY")]
    pub busy_policy: Option<BusyPolicy>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log output format (console, compact, json)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub print_env_example: bool,

    /// Print version and exit
    #[arg(short = 'V', long)]
    pub version: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Line printed by `--version`
    pub fn version_line() -> String {
        format!("{} v{}", crate::BIN_NAME, crate::VERSION)
    }
}

fn parse_duration(s: &str) -> Result<u64, String> {
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    let max = crate::defaults::MAX_TIMEOUT.as_secs();
    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > max {
                Err(format!("Duration cannot exceed {} seconds", max))
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

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
