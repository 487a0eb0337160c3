//! Measurement service abstraction
//!
//! The collector only sees a [`MeasurementService`]; the production
//! implementation runs the external tool, tests substitute doubles.

pub mod slot;

pub use slot::SerializedService;

use crate::error::MeasurementError;
use crate::logging::Logger;
use crate::models::{MeasurementConfig, MeasurementResult};
use crate::runner::MeasurementRunner;
use async_trait::async_trait;
use std::time::Instant;

/// Something that can perform one measurement on demand
#[async_trait]
pub trait MeasurementService: Send + Sync {
    async fn test(&self) -> Result<MeasurementResult, MeasurementError>;
}

/// Runs the speedtest tool with a fixed configuration
pub struct SpeedtestService {
    runner: MeasurementRunner,
    config: MeasurementConfig,
    logger: Logger,
}

impl SpeedtestService {
    pub fn new(runner: MeasurementRunner, config: MeasurementConfig) -> Self {
        Self {
            runner,
            config,
            logger: Logger::silent("speedtest"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }
}

#[async_trait]
impl MeasurementService for SpeedtestService {
    async fn test(&self) -> Result<MeasurementResult, MeasurementError> {
        let correlation_id = self.logger.start_operation("speedtest").await;
        let started_at = Instant::now();

        let outcome = self.runner.run(&self.config).await;
        let duration_ms = started_at.elapsed().as_millis() as u64;
        match &outcome {
            Ok(result) => {
                self.logger
                    .info("Speedtest completed")
                    .correlation_id(&correlation_id)
                    .field("duration_ms", duration_ms)
                    .measurement(result)
                    .log()
                    .await;
            }
            Err(error) => {
                self.logger
                    .error(&format!("Speedtest failed: {}", error))
                    .correlation_id(&correlation_id)
                    .field("duration_ms", duration_ms)
                    .error_info(error)
                    .log()
                    .await;
            }
        }

        self.logger
            .end_operation(&correlation_id, "speedtest", outcome.is_ok())
            .await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_tool_surfaces_process_error() {
        let runner = MeasurementRunner::new("/nonexistent/speedtest-binary");
        let service = SpeedtestService::new(runner, MeasurementConfig::new(Duration::from_secs(5)));

        let error = service.test().await.unwrap_err();
        assert!(matches!(error, MeasurementError::Process { started: false, .. }));
    }

    #[test]
    fn test_config_is_kept() {
        let config = MeasurementConfig::default().with_server_id(Some(7));
        let service = SpeedtestService::new(MeasurementRunner::new("speedtest"), config.clone());
        assert_eq!(service.config(), &config);
    }
}
