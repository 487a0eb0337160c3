//! Configuration data model and validation

use crate::logging::{LogFormat, LogLevel};
use crate::models::MeasurementConfig;
use crate::types::{AppError, BusyPolicy, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
///
/// Built once at startup and never mutated afterwards; the pieces the
/// measurement path needs are handed out as [`MeasurementConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server listens on
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Speedtest server to use, `None` for auto-selection
    #[serde(default)]
    pub server_id: Option<u32>,

    /// Local address the measurement binds to
    #[serde(default)]
    pub source_address: Option<String>,

    /// Hard limit for a single measurement run
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Command used to launch the measurement tool, whitespace separated
    #[serde(default = "default_speedtest_command")]
    pub speedtest_command: String,

    /// Directory served for every path other than the probe
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Behaviour of a scrape that finds a measurement already running
    #[serde(default)]
    pub busy_policy: BusyPolicy,

    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            port: default_port(),
            server_id: None,
            source_address: None,
            timeout_seconds: default_timeout_secs(),
            speedtest_command: default_speedtest_command(),
            static_dir: default_static_dir(),
            busy_policy: BusyPolicy::default(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Socket address for the HTTP listener
    pub fn listen_socket_addr(&self) -> Result<SocketAddr> {
        let ip = IpAddr::from_str(self.listen_address.trim())
            .map_err(|e| AppError::config(format!("Invalid listen address '{}': {}", self.listen_address, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Parsed source address, if one is configured
    pub fn source_ip(&self) -> Result<Option<IpAddr>> {
        match self.source_address.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(address) => IpAddr::from_str(address)
                .map(Some)
                .map_err(|e| AppError::config(format!("Invalid source address '{}': {}", address, e))),
        }
    }

    /// Immutable settings for every measurement run
    pub fn measurement_config(&self) -> Result<MeasurementConfig> {
        Ok(MeasurementConfig::new(self.timeout())
            .with_server_id(self.server_id)
            .with_source_address(self.source_ip()?))
    }

    /// Program and leading arguments of the measurement tool
    pub fn command_line(&self) -> Result<(String, Vec<String>)> {
        let mut parts = self.speedtest_command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::config("Speedtest command cannot be empty"))?;
        Ok((program, parts.collect()))
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        self.listen_socket_addr()?;

        if self.port == 0 {
            return Err(AppError::config("Port must be greater than 0"));
        }

        self.source_ip()?;

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > crate::defaults::MAX_TIMEOUT.as_secs() {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                crate::defaults::MAX_TIMEOUT.as_secs()
            )));
        }

        self.command_line()?;

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(address) = std::env::var("SPEEDTEST_ADDRESS") {
            self.listen_address = address.trim().to_string();
        }

        if let Ok(port) = std::env::var("SPEEDTEST_PORT") {
            self.port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_PORT value '{}': {}", port, e)))?;
        }

        if let Ok(server_id) = std::env::var("SPEEDTEST_SERVER_ID") {
            let server_id = server_id.trim();
            self.server_id = if server_id.is_empty() {
                None
            } else {
                Some(server_id.parse()
                    .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_SERVER_ID value '{}': {}", server_id, e)))?)
            };
        }

        if let Ok(source_address) = std::env::var("SPEEDTEST_SOURCE_ADDRESS") {
            let source_address = source_address.trim();
            self.source_address = (!source_address.is_empty()).then(|| source_address.to_string());
        }

        if let Ok(timeout) = std::env::var("SPEEDTEST_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(command) = std::env::var("SPEEDTEST_COMMAND") {
            self.speedtest_command = command;
        }

        if let Ok(static_dir) = std::env::var("SPEEDTEST_STATIC_DIR") {
            self.static_dir = PathBuf::from(static_dir);
        }

        if let Ok(policy) = std::env::var("SPEEDTEST_BUSY_POLICY") {
            self.busy_policy = policy.parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_BUSY_POLICY value '{}': {}", policy, e)))?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.log_level = level.parse()
                .map_err(|e| AppError::config(format!("Invalid LOG_LEVEL value '{}': {}", level, e)))?;
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.log_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid LOG_FORMAT value '{}': {}", format, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_listen_address() -> String {
    crate::defaults::DEFAULT_LISTEN_ADDRESS.to_string()
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_speedtest_command() -> String {
    crate::defaults::DEFAULT_SPEEDTEST_COMMAND.to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_STATIC_DIR)
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_format() -> LogFormat {
    LogFormat::Console
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
