//! Single-slot serialization of measurements
//!
//! At most one measurement runs at a time. A scrape arriving while the slot
//! is taken either waits for it or is refused, depending on [`BusyPolicy`].
//! The measurement itself runs on its own task that owns the slot permit,
//! so a scraper hanging up does not cut a run short nor leave the slot held.

use super::MeasurementService;
use crate::error::MeasurementError;
use crate::logging::Logger;
use crate::models::MeasurementResult;
use crate::types::BusyPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub struct SerializedService<S: ?Sized> {
    inner: Arc<S>,
    slot: Arc<Semaphore>,
    policy: BusyPolicy,
    logger: Logger,
}

impl<S: MeasurementService + ?Sized + 'static> SerializedService<S> {
    pub fn new(inner: Arc<S>, policy: BusyPolicy) -> Self {
        Self {
            inner,
            slot: Arc::new(Semaphore::new(1)),
            policy,
            logger: Logger::silent("slot"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn policy(&self) -> BusyPolicy {
        self.policy
    }

    /// Whether a measurement currently holds the slot
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, MeasurementError> {
        match self.policy {
            BusyPolicy::Queue => {
                if self.is_busy() {
                    self.logger.debug("Measurement in progress, waiting for slot").log().await;
                }
                Arc::clone(&self.slot)
                    .acquire_owned()
                    .await
                    .map_err(|_| MeasurementError::Interrupted("measurement slot closed".to_string()))
            }
            BusyPolicy::Reject => Arc::clone(&self.slot).try_acquire_owned().map_err(|_| MeasurementError::Busy),
        }
    }
}

#[async_trait]
impl<S: MeasurementService + ?Sized + 'static> MeasurementService for SerializedService<S> {
    async fn test(&self) -> Result<MeasurementResult, MeasurementError> {
        let permit = match self.acquire().await {
            Ok(permit) => permit,
            Err(error) => {
                self.logger
                    .warn("Measurement slot unavailable")
                    .error_info(&error)
                    .log()
                    .await;
                return Err(error);
            }
        };

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _permit = permit;
            inner.test().await
        });

        task.await
            .map_err(|e| MeasurementError::Interrupted(e.to_string()))?
    }
}
