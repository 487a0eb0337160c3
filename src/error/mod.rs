//! Error handling for the speedtest exporter
//!
//! Two layers: [`MeasurementError`] describes why a single measurement run
//! failed and stays local to the scrape that triggered it, while [`AppError`]
//! covers everything the process itself can fail on (configuration, binding
//! the listener, rendering).

use std::time::Duration;
use thiserror::Error;

/// Why a measurement produced no result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// The tool could not be started or exited with a non-zero status
    #[error("speedtest process failed: {message}")]
    Process {
        message: String,
        /// False when the tool could not be spawned at all
        started: bool,
        /// Exit code, `None` if the tool never started or was killed by a signal
        exit_code: Option<i32>,
        /// Trimmed standard error of the tool, if it printed anything
        stderr: Option<String>,
    },

    /// The tool started but its pipes or exit status could not be read
    #[error("speedtest output could not be collected: {0}")]
    Output(String),

    /// The tool's output was not a usable result document
    #[error("speedtest output could not be parsed: {0}")]
    Parse(String),

    /// The run exceeded its budget and the child was terminated
    #[error("speedtest timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Another measurement holds the slot and the policy is to reject
    #[error("a speedtest is already in progress")]
    Busy,

    /// The measurement task ended without producing an outcome
    #[error("speedtest task was interrupted: {0}")]
    Interrupted(String),
}

impl MeasurementError {
    /// Failure to spawn the tool at all
    pub fn spawn<S: Into<String>>(message: S) -> Self {
        Self::Process {
            message: message.into(),
            started: false,
            exit_code: None,
            stderr: None,
        }
    }

    /// Tool ran but reported failure
    pub fn exit(exit_code: Option<i32>, stderr: Option<String>) -> Self {
        let message = match exit_code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        };
        Self::Process {
            message,
            started: true,
            exit_code,
            stderr,
        }
    }

    /// I/O failure after the tool was started
    pub fn output<S: Into<String>>(message: S) -> Self {
        Self::Output(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Stage of the pipeline that failed, used in logs
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Process { started: false, .. } => "spawn",
            Self::Process { .. } => "exit",
            Self::Output(_) => "output",
            Self::Parse(_) => "decode",
            Self::Timeout(_) => "timeout",
            Self::Busy => "slot",
            Self::Interrupted(_) => "task",
        }
    }

    /// Whether the scraper should expect a later scrape to succeed without
    /// operator action
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Timeout(_) | Self::Interrupted(_))
    }
}

/// Application level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (binding sockets, reading files)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (addresses, numbers, JSON)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Measurement failures surfaced outside a scrape
    #[error("Measurement error: {0}")]
    Measurement(#[from] MeasurementError),

    /// Exposition rendering errors
    #[error("Metrics encoding error: {0}")]
    Encoding(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server(message.into())
    }

    pub fn encoding<S: Into<String>>(message: S) -> Self {
        Self::Encoding(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Server(_) => "SERVER",
            Self::Measurement(_) => "MEASUREMENT",
            Self::Encoding(_) => "ENCODING",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Server(_) => 2,
            Self::Measurement(_) => 3,
            Self::Io(_) => 5,
            Self::Encoding(_) => 6,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Server(_) | Self::Io(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Measurement(_) | Self::Encoding(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

impl From<prometheus::Error> for AppError {
    fn from(error: prometheus::Error) -> Self {
        Self::encoding(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
