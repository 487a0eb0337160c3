//! On-demand metric collection
//!
//! Every scrape triggers exactly one measurement through the configured
//! [`MeasurementService`] and renders its values into a fresh registry, so
//! no value from an earlier scrape can leak into a later one.

use crate::error::{AppError, MeasurementError, Result};
use crate::models::metrics::SAMPLES_PER_MEASUREMENT;
use crate::models::MetricSample;
use crate::service::MeasurementService;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Content type of the Prometheus text exposition format
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct MetricCollector {
    service: Arc<dyn MeasurementService>,
}

impl MetricCollector {
    pub fn new(service: Arc<dyn MeasurementService>) -> Self {
        Self { service }
    }

    /// Run one measurement and yield its gauges
    ///
    /// A failed measurement yields no samples at all.
    pub async fn collect(
        &self,
    ) -> std::result::Result<std::array::IntoIter<MetricSample, SAMPLES_PER_MEASUREMENT>, MeasurementError> {
        let result = self.service.test().await?;
        Ok(MetricSample::from_result(&result).into_iter())
    }

    /// Run one measurement and render it in the text exposition format
    pub async fn scrape(&self) -> Result<String> {
        let samples = self.collect().await?;
        render_exposition(samples)
    }
}

/// Render samples as unlabelled gauges
pub fn render_exposition<I>(samples: I) -> Result<String>
where
    I: IntoIterator<Item = MetricSample>,
{
    let registry = Registry::new();
    for sample in samples {
        let gauge = Gauge::with_opts(Opts::new(sample.name, sample.help))?;
        gauge.set(sample.value);
        registry.register(Box::new(gauge))?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| AppError::encoding(format!("exposition is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasurementResult;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedService(std::result::Result<MeasurementResult, MeasurementError>);

    #[async_trait]
    impl MeasurementService for FixedService {
        async fn test(&self) -> std::result::Result<MeasurementResult, MeasurementError> {
            self.0.clone()
        }
    }

    fn values(exposition: &str) -> HashMap<String, f64> {
        exposition
            .lines()
            .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
            .filter_map(|line| {
                let (name, value) = line.split_once(' ')?;
                Some((name.to_string(), value.trim().parse().ok()?))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_collect_yields_five_gauges() {
        let result = MeasurementResult::new(100_000_000.0, 50_000_000.0, 14.2, 98_765_432, 45_678_901).unwrap();
        let collector = MetricCollector::new(Arc::new(FixedService(Ok(result))));

        let samples: Vec<MetricSample> = collector.collect().await.unwrap().collect();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].name, "download_speed_bps");
    }

    #[tokio::test]
    async fn test_scrape_renders_values() {
        let result = MeasurementResult::new(100_000_000.0, 50_000_000.0, 14.2, 98_765_432, 45_678_901).unwrap();
        let collector = MetricCollector::new(Arc::new(FixedService(Ok(result))));

        let body = collector.scrape().await.unwrap();
        let values = values(&body);

        assert_eq!(values.len(), 5);
        assert_eq!(values["download_speed_bps"], 100_000_000.0);
        assert_eq!(values["upload_speed_bps"], 50_000_000.0);
        assert_eq!(values["ping_ms"], 14.2);
        assert_eq!(values["bytes_received"], 98_765_432.0);
        assert_eq!(values["bytes_sent"], 45_678_901.0);

        assert!(body.contains("# TYPE download_speed_bps gauge"));
        assert!(body.contains("# HELP ping_ms Latency (ms)"));
    }

    #[tokio::test]
    async fn test_failed_measurement_yields_nothing() {
        let collector = MetricCollector::new(Arc::new(FixedService(Err(MeasurementError::parse("not json")))));

        assert!(collector.collect().await.is_err());
        assert!(matches!(
            collector.scrape().await,
            Err(AppError::Measurement(MeasurementError::Parse(_)))
        ));
    }

    #[test]
    fn test_empty_exposition() {
        assert_eq!(render_exposition(Vec::new()).unwrap(), "");
    }
}
