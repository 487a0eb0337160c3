//! Measurement configuration and result records

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Per-deployment settings for every measurement run
///
/// A server id of `0` is the same as no server id: the tool picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementConfig {
    source_address: Option<IpAddr>,
    server_id: Option<u32>,
    timeout: Duration,
}

impl MeasurementConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            source_address: None,
            server_id: None,
            timeout,
        }
    }

    pub fn with_server_id(mut self, server_id: Option<u32>) -> Self {
        self.server_id = server_id.filter(|id| *id != 0);
        self
    }

    pub fn with_source_address(mut self, source_address: Option<IpAddr>) -> Self {
        self.source_address = source_address;
        self
    }

    pub fn source_address(&self) -> Option<IpAddr> {
        self.source_address
    }

    pub fn server_id(&self) -> Option<u32> {
        self.server_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_TIMEOUT)
    }
}

/// Outcome of one successful measurement run
///
/// Bandwidths are already in bits per second. All values are finite and
/// non-negative; the constructor refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    download_bps: f64,
    upload_bps: f64,
    ping_ms: f64,
    bytes_received: u64,
    bytes_sent: u64,
}

impl MeasurementResult {
    /// Returns `None` if any rate or latency is negative, NaN or infinite
    pub fn new(download_bps: f64, upload_bps: f64, ping_ms: f64, bytes_received: u64, bytes_sent: u64) -> Option<Self> {
        let valid = |value: f64| value.is_finite() && value >= 0.0;
        if !(valid(download_bps) && valid(upload_bps) && valid(ping_ms)) {
            return None;
        }

        Some(Self {
            download_bps,
            upload_bps,
            ping_ms,
            bytes_received,
            bytes_sent,
        })
    }

    pub fn download_bps(&self) -> f64 {
        self.download_bps
    }

    pub fn upload_bps(&self) -> f64 {
        self.upload_bps
    }

    pub fn ping_ms(&self) -> f64 {
        self.ping_ms
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}
