// Schedule Service - schedule changes coming from the presentation shell

use crate::application::{ScheduleStore, SchedulerController};
use crate::domain::CronExpr;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Keeps the stored schedule and the armed trigger in step
pub struct ScheduleService {
    store: Arc<ScheduleStore>,
    controller: Arc<SchedulerController>,
    // Held across persist-then-arm so concurrent changes cannot interleave
    changing: Mutex<()>,
}

impl ScheduleService {
    pub fn new(store: Arc<ScheduleStore>, controller: Arc<SchedulerController>) -> Self {
        Self {
            store,
            controller,
            changing: Mutex::new(()),
        }
    }

    /// Stored expression (created with the default on first use)
    pub async fn current_schedule(&self) -> Result<String> {
        self.store.get_schedule().await
    }

    /// Persist `expr` and re-arm the trigger with it
    ///
    /// # Errors
    /// - AppError::InvalidSchedule before anything is persisted; the armed trigger keeps running
    /// - AppError::Database if the store rejects the write; the armed trigger keeps running
    pub async fn change_schedule(&self, expr: &str) -> Result<()> {
        if let Err(e) = CronExpr::parse(expr) {
            warn!(schedule = expr, error = %e, "Rejected schedule change");
            return Err(e.into());
        }

        let _guard = self.changing.lock().await;
        self.store.set_schedule(expr).await?;
        self.controller.arm(expr)?;

        info!(schedule = expr, "Backup schedule changed");
        Ok(())
    }

    /// Arm the trigger with whatever is stored (startup path)
    pub async fn arm_stored(&self) -> Result<String> {
        let _guard = self.changing.lock().await;
        let expr = self.store.get_schedule().await?;
        self.controller.arm(&expr)?;
        Ok(expr)
    }

    pub fn controller(&self) -> &Arc<SchedulerController> {
        &self.controller
    }
}
