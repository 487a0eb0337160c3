//! Data models and structures for the speedtest exporter

pub mod config;
pub mod measurement;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use measurement::{MeasurementConfig, MeasurementResult};
pub use metrics::MetricSample;
