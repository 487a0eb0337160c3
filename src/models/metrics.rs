//! Metric samples emitted for a scrape

use crate::models::MeasurementResult;
use serde::Serialize;

pub const DOWNLOAD_SPEED_BPS: &str = "download_speed_bps";
pub const UPLOAD_SPEED_BPS: &str = "upload_speed_bps";
pub const PING_MS: &str = "ping_ms";
pub const BYTES_RECEIVED: &str = "bytes_received";
pub const BYTES_SENT: &str = "bytes_sent";

/// Number of samples a successful scrape produces
pub const SAMPLES_PER_MEASUREMENT: usize = 5;

/// One unlabelled gauge value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub name: &'static str,
    pub help: &'static str,
    pub value: f64,
}

impl MetricSample {
    pub fn gauge(name: &'static str, help: &'static str, value: f64) -> Self {
        Self { name, help, value }
    }

    /// The fixed gauge set for a measurement, in exposition order
    pub fn from_result(result: &MeasurementResult) -> [MetricSample; SAMPLES_PER_MEASUREMENT] {
        [
            Self::gauge(DOWNLOAD_SPEED_BPS, "Download speed (bit/s)", result.download_bps()),
            Self::gauge(UPLOAD_SPEED_BPS, "Upload speed (bit/s)", result.upload_bps()),
            Self::gauge(PING_MS, "Latency (ms)", result.ping_ms()),
            Self::gauge(BYTES_RECEIVED, "Bytes received during test", result.bytes_received() as f64),
            Self::gauge(BYTES_SENT, "Bytes sent during test", result.bytes_sent() as f64),
        ]
    }
}
