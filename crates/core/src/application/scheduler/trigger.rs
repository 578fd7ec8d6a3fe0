// Trigger - one armed cron timer running as a tokio task

use super::constants::MAX_TRIGGER_SLEEP;
use super::Dispatcher;
use crate::domain::CronExpr;
use crate::port::TimeProvider;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Revocable handle to a running trigger task. Dropping it cancels the task.
pub(crate) struct Trigger {
    cron: CronExpr,
    handle: JoinHandle<()>,
}

impl Trigger {
    /// Start firing `cron`; the first fire time is fixed at arm time
    pub(crate) fn spawn(
        cron: CronExpr,
        dispatcher: Arc<Dispatcher>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let first = cron.next_after(&time_provider.now());
        let handle = tokio::spawn(run(cron.clone(), first, dispatcher, time_provider));
        Self { cron, handle }
    }

    pub(crate) fn cron(&self) -> &CronExpr {
        &self.cron
    }
}

impl Drop for Trigger {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(
    cron: CronExpr,
    first: Option<DateTime<Utc>>,
    dispatcher: Arc<Dispatcher>,
    time_provider: Arc<dyn TimeProvider>,
) {
    let mut next = first;

    loop {
        let Some(fire_at) = next else {
            warn!(schedule = %cron, "Schedule has no upcoming fire time; trigger idle");
            return;
        };

        let now = time_provider.now();
        if now < fire_at {
            let wait = (fire_at - now)
                .to_std()
                .unwrap_or_default()
                .min(MAX_TRIGGER_SLEEP);
            tokio::time::sleep(wait).await;
            continue;
        }

        debug!(schedule = %cron, fire_at = %fire_at, "Trigger fired");
        match dispatcher.dispatch_all().await {
            Ok(count) => info!(schedule = %cron, jobs = count, "Backup jobs dispatched"),
            // The next tick still runs
            Err(e) => error!(schedule = %cron, error = %e, "Backup dispatch failed"),
        }

        // Missed minutes (suspend, long dispatch) are coalesced into this one firing
        next = cron.next_after(&time_provider.now());
    }
}
