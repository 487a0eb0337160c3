//! Main application orchestration and execution

use crate::{
    collector::MetricCollector,
    config::{display_config_summary, validate_config, ValidationLevel},
    error::{AppError, Result},
    logging::LoggerFactory,
    models::Config,
    runner::MeasurementRunner,
    server::{self, ServerState},
    service::{MeasurementService, SerializedService, SpeedtestService},
};
use axum::Router;
use std::sync::Arc;

/// Wires configuration, measurement pipeline and HTTP server together
pub struct App {
    config: Config,
    loggers: LoggerFactory,
}

impl App {
    /// Create a new application instance from a loaded configuration
    pub fn new(config: Config) -> Self {
        let loggers = LoggerFactory::new(&config);
        Self { config, loggers }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serialized measurement service backed by the configured tool
    pub async fn build_service(&self) -> Result<Arc<dyn MeasurementService>> {
        let (program, leading_args) = self.config.command_line()?;
        let runner = MeasurementRunner::new(program)
            .with_leading_args(leading_args)
            .with_logger(self.loggers.create_logger("RUNNER").await);

        let speedtest = SpeedtestService::new(runner, self.config.measurement_config()?)
            .with_logger(self.loggers.create_logger("SERVICE").await);

        let serialized = SerializedService::new(Arc::new(speedtest), self.config.busy_policy)
            .with_logger(self.loggers.create_logger("COLLECTOR").await);

        Ok(Arc::new(serialized))
    }

    /// Router serving `/probe` on top of the given service
    pub async fn build_router(&self, service: Arc<dyn MeasurementService>) -> Router {
        let state = ServerState::new(
            MetricCollector::new(service),
            self.loggers.create_logger("SERVER").await,
            self.config.timeout(),
        );
        server::build_router(state, self.config.static_dir.clone())
    }

    /// Run the application until shutdown
    pub async fn run(self) -> Result<()> {
        let logger = self.loggers.create_logger("APP").await;

        let warnings = validate_config(&self.config)?;
        for warning in &warnings {
            let builder = match warning.level {
                ValidationLevel::Info => logger.info(&warning.message),
                ValidationLevel::Warning => logger.warn(&warning.message),
            };
            builder.field("source", "config").log().await;
        }

        logger
            .info(&format!("{} v{} starting", crate::BIN_NAME, crate::VERSION))
            .field("session_id", self.loggers.session_id())
            .field("busy_policy", self.config.busy_policy.as_str())
            .field("timeout_secs", self.config.timeout_seconds)
            .log()
            .await;
        logger
            .debug(&format!("Configuration:\n{}", display_config_summary(&self.config)))
            .log()
            .await;

        let service = self.build_service().await?;
        let router = self.build_router(service).await;

        let address = self.config.listen_socket_addr()?;
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|e| AppError::server(format!("Failed to bind {}: {}", address, e)))?;

        server::serve(listener, router, self.loggers.create_logger("SERVER").await).await
    }
}
