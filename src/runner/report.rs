//! Decoding of the tool's JSON result document

use crate::error::MeasurementError;
use crate::models::MeasurementResult;
use serde::Deserialize;

/// The subset of the tool's result document the exporter relies on
#[derive(Debug, Clone, Deserialize)]
pub struct SpeedtestReport {
    pub download: Transfer,
    pub upload: Transfer,
    pub ping: Ping,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub server: Option<ServerInfo>,
    #[serde(default)]
    pub result: Option<ResultLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    /// Bytes per second
    pub bandwidth: f64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ping {
    /// Milliseconds
    pub latency: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultLink {
    #[serde(default)]
    pub url: Option<String>,
}

impl SpeedtestReport {
    /// Convert to a result record, turning bytes/s into bits/s
    pub fn to_result(&self) -> Result<MeasurementResult, MeasurementError> {
        MeasurementResult::new(
            self.download.bandwidth * 8.0,
            self.upload.bandwidth * 8.0,
            self.ping.latency,
            self.download.bytes,
            self.upload.bytes,
        )
        .ok_or_else(|| MeasurementError::parse("result contains negative or non-finite values"))
    }
}

/// Parse the tool's standard output
///
/// The whole output, minus surrounding whitespace, must be one JSON document.
pub fn parse_report(stdout: &[u8]) -> Result<SpeedtestReport, MeasurementError> {
    let text = std::str::from_utf8(stdout)
        .map_err(|e| MeasurementError::parse(format!("output is not valid UTF-8: {}", e)))?
        .trim();

    if text.is_empty() {
        return Err(MeasurementError::parse("output is empty"));
    }

    serde_json::from_str(text).map_err(|e| MeasurementError::parse(e.to_string()))
}

/// Parse and convert in one step
pub fn decode_result(stdout: &[u8]) -> Result<MeasurementResult, MeasurementError> {
    parse_report(stdout)?.to_result()
}
