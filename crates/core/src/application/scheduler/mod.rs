//! Scheduler Controller - owns the single live backup trigger
//!
//! States: Unarmed -> Armed. `arm` cancels the previous trigger before the new
//! one is installed, so at most one trigger task exists at any time.

mod constants;
mod trigger;

use crate::application::{BackupExecutor, DeviceRegistry};
use crate::domain::CronExpr;
use crate::error::Result;
use crate::port::TimeProvider;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;
use trigger::Trigger;

/// Fans one tick out into one backup job per registered device
pub(crate) struct Dispatcher {
    registry: Arc<DeviceRegistry>,
    executor: Arc<BackupExecutor>,
}

impl Dispatcher {
    async fn dispatch_all(&self) -> Result<usize> {
        let devices = self.registry.list_devices().await?;

        // Fire-and-forget: outcomes are only logged. A device whose command
        // cannot be built was logged by the executor and is skipped.
        let mut started = 0;
        for device in &devices {
            if self.executor.backup_device(device).is_ok() {
                started += 1;
            }
        }

        Ok(started)
    }
}

/// Scheduler Controller
pub struct SchedulerController {
    dispatcher: Arc<Dispatcher>,
    time_provider: Arc<dyn TimeProvider>,
    armed: Mutex<Option<Trigger>>,
}

impl SchedulerController {
    /// Create an unarmed controller
    pub fn new(
        registry: Arc<DeviceRegistry>,
        executor: Arc<BackupExecutor>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher { registry, executor }),
            time_provider,
            armed: Mutex::new(None),
        }
    }

    /// Arm (or re-arm) the trigger with `expr`
    ///
    /// # Errors
    /// - AppError::InvalidSchedule if `expr` does not parse; the current trigger is left untouched
    pub fn arm(&self, expr: &str) -> Result<()> {
        let cron = CronExpr::parse(expr)?;

        let mut slot = self.slot();
        // Cancel before installing so two triggers never overlap
        if let Some(previous) = slot.take() {
            info!(schedule = %previous.cron(), "Cancelling previous backup trigger");
        }

        let trigger = Trigger::spawn(
            cron,
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.time_provider),
        );
        let next_fire = trigger.cron().next_after(&self.time_provider.now());
        *slot = Some(trigger);

        info!(schedule = expr, next_fire = ?next_fire, "Backup scheduler started");
        Ok(())
    }

    /// Start one backup job per registered device and return how many were started
    ///
    /// Returns once every job has been initiated, not completed.
    pub async fn dispatch_all(&self) -> Result<usize> {
        self.dispatcher.dispatch_all().await
    }

    /// Expression of the armed trigger
    pub fn current_expression(&self) -> Option<String> {
        self.slot().as_ref().map(|t| t.cron().as_str().to_string())
    }

    pub fn is_armed(&self) -> bool {
        self.slot().is_some()
    }

    /// Next instant the armed trigger will fire
    pub fn next_fire_time(&self) -> Option<DateTime<Utc>> {
        self.slot()
            .as_ref()
            .and_then(|t| t.cron().next_after(&self.time_provider.now()))
    }

    /// Cancel the trigger (returns whether one was armed). Running backups continue.
    pub fn disarm(&self) -> bool {
        let was_armed = self.slot().take().is_some();
        if was_armed {
            info!("Backup scheduler stopped");
        }
        was_armed
    }

    fn slot(&self) -> MutexGuard<'_, Option<Trigger>> {
        // Trigger state stays consistent even if a holder panicked
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SchedulerController {
    fn drop(&mut self) {
        self.disarm();
    }
}
