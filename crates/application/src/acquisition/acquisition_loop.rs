use std::sync::Arc;

use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use domain::{
    Clock, FieldBus, PollSettings, Reading, RecordStore, StorageError, UnitId, WeighRecord,
};

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Record for device {device} could not be persisted: {source}")]
    Persist {
        device: UnitId,
        #[source]
        source: StorageError,
    },
}

/// What happened to one device during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// Ready flag was false, nothing to do
    Idle,
    /// Coil or register read failed, retried next tick
    ReadFailed,
    /// Table could not be opened, retried next tick
    TableUnavailable,
    /// Row appended and ready flag cleared
    Recorded,
    /// Row appended but the ready flag stayed set
    ClearFailed,
}

/// Polls every configured device on a fixed interval and persists one
/// record per ready device.
pub struct AcquisitionLoop {
    bus: Box<dyn FieldBus>,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    settings: PollSettings,
    cancel_token: CancellationToken,
}

impl AcquisitionLoop {
    pub fn new(
        bus: Box<dyn FieldBus>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        settings: PollSettings,
    ) -> Self {
        Self {
            bus,
            store,
            clock,
            settings,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token fired when the loop must stop after the current tick
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run until the cancellation token fires (`Ok`) or a record cannot be
    /// written (`Err`).
    pub async fn run(mut self) -> Result<(), AcquisitionError> {
        let period = self.settings.interval();
        info!(
            devices = ?self.settings.devices,
            interval_ms = %self.settings.interval_ms,
            "Starting poll loop"
        );

        let mut timer = tokio::time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = timer.tick() => {
                    self.tick().await?;
                }
            }
        }

        Ok(())
    }

    /// Poll each configured device once, in order. A failed flag clear
    /// fires the cancellation token; the remaining devices are still polled
    /// and the loop stops before the next tick.
    pub async fn tick(&mut self) -> Result<(), AcquisitionError> {
        let devices = self.settings.devices.clone();
        for unit in devices {
            if self.poll_device(unit).await? == DeviceOutcome::ClearFailed
                && !self.cancel_token.is_cancelled()
            {
                self.cancel_token.cancel();
            }
        }
        Ok(())
    }

    pub async fn poll_device(&mut self, unit: UnitId) -> Result<DeviceOutcome, AcquisitionError> {
        let ready = match self.bus.read_coil(unit, self.settings.ready_coil).await {
            Ok(ready) => ready,
            Err(e) => {
                warn!(device = %unit, error = %e, "Ready flag read failed");
                return Ok(DeviceOutcome::ReadFailed);
            }
        };
        if !ready {
            return Ok(DeviceOutcome::Idle);
        }

        let Some(reading) = self.read_weights(unit).await else {
            return Ok(DeviceOutcome::ReadFailed);
        };

        let Some(record) = WeighRecord::capture(&reading, self.clock.now()) else {
            return Ok(DeviceOutcome::Idle);
        };
        debug!(device = %unit, ?record, "Captured record");

        match self.store.append(&record).await {
            Ok(()) => {}
            Err(e) if !e.is_fatal() => {
                warn!(device = %unit, error = %e, "Table unavailable, skipping");
                return Ok(DeviceOutcome::TableUnavailable);
            }
            Err(e) => {
                error!(device = %unit, error = %e, "Failed to write record");
                return Err(AcquisitionError::Persist {
                    device: unit,
                    source: e,
                });
            }
        }
        info!(
            device = %unit,
            before = record.weight_before,
            after = record.weight_after,
            total = record.weight_total,
            "Record appended"
        );

        if let Err(e) = self.bus.write_coil(unit, self.settings.ready_coil, false).await {
            error!(device = %unit, error = %e, "Failed to clear ready flag, stopping");
            return Ok(DeviceOutcome::ClearFailed);
        }

        Ok(DeviceOutcome::Recorded)
    }

    async fn read_weights(&mut self, unit: UnitId) -> Option<Reading> {
        let before = match self
            .bus
            .read_holding_register(unit, self.settings.weight_before_register)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(device = %unit, error = %e, "Weight before read failed");
                return None;
            }
        };

        let after = match self
            .bus
            .read_holding_register(unit, self.settings.weight_after_register)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(device = %unit, error = %e, "Weight after read failed");
                return None;
            }
        };

        Some(Reading::new(unit, before, after))
    }
}
