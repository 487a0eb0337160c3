//! Prometheus Speedtest Exporter
//!
//! Runs an internet bandwidth measurement on demand, once per scrape of
//! `/probe`, and exposes the result as five unlabelled gauges. The
//! measurement itself is delegated to an external speedtest tool.

pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod runner;
pub mod server;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use collector::MetricCollector;
pub use error::{AppError, MeasurementError, Result};
pub use models::{Config, MeasurementConfig, MeasurementResult, MetricSample};
pub use runner::MeasurementRunner;
pub use service::{MeasurementService, SerializedService, SpeedtestService};
pub use types::BusyPolicy;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BIN_NAME: &str = "prometheus_speedtest";

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 9516;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
    pub const MAX_TIMEOUT: Duration = Duration::from_secs(900);
    pub const DEFAULT_SPEEDTEST_COMMAND: &str = "speedtest";
    pub const DEFAULT_STATIC_DIR: &str = "static";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
