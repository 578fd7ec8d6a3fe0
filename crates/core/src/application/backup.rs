// Backup Executor - fire-and-forget backup of a single device

use crate::domain::{BackupCommand, BackupJob, Device};
use crate::error::Result;
use crate::port::{ExecutionError, IdProvider, RemoteExecutor, TimeProvider};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// Final state of one backup job, reported to the outcome sink
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    pub job: BackupJob,
    pub duration_ms: Option<i64>,
    pub error: Option<ExecutionError>,
}

impl BackupOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Backup Executor
///
/// Every call to `backup_device` runs in its own task. Failures are logged with
/// the device address and never reach the caller.
pub struct BackupExecutor {
    remote: Arc<dyn RemoteExecutor>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    command: BackupCommand,
    outcomes: Option<UnboundedSender<BackupOutcome>>,
}

impl BackupExecutor {
    pub fn new(
        remote: Arc<dyn RemoteExecutor>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
        command: BackupCommand,
    ) -> Self {
        Self {
            remote,
            time_provider,
            id_provider,
            command,
            outcomes: None,
        }
    }

    /// Report every finished job on `sink` (used for logging only)
    pub fn with_outcome_sink(mut self, sink: UnboundedSender<BackupOutcome>) -> Self {
        self.outcomes = Some(sink);
        self
    }

    /// Start a backup of `device` and return without waiting for it
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - AppError::Execution if no command line can be built for `device`; nothing is started
    pub fn backup_device(&self, device: &Device) -> Result<BackupJob> {
        let job = BackupJob::new(
            self.id_provider.generate_id(),
            device.clone(),
            self.time_provider.now(),
            &self.command,
        )
        .inspect_err(|e| error!(ip = %device.ip, error = %e, "Error backing up device"))?;

        info!(
            job_id = %job.id,
            ip = %job.device.ip,
            output_file = %job.output_file,
            "Starting backup"
        );

        let remote = Arc::clone(&self.remote);
        let outcomes = self.outcomes.clone();
        let spawned = job.clone();

        tokio::spawn(async move {
            let command = spawned.command.clone();
            // Inner task: a panicking executor fails this job only
            let handle = tokio::spawn(async move { remote.run(&command).await });

            let result = match handle.await {
                Ok(Ok(result)) if result.is_success() => Ok(result.duration_ms),
                Ok(Ok(result)) => Err(ExecutionError::NonZeroExit {
                    exit_code: result.exit_code,
                    stderr: result.stderr.unwrap_or_default().trim().to_string(),
                }),
                Ok(Err(e)) => Err(e),
                Err(join_err) => Err(ExecutionError::Panicked(join_err.to_string())),
            };

            report(spawned, result, outcomes);
        });

        Ok(job)
    }
}

fn report(
    job: BackupJob,
    result: std::result::Result<i64, ExecutionError>,
    outcomes: Option<UnboundedSender<BackupOutcome>>,
) {
    let outcome = match result {
        Ok(duration_ms) => {
            info!(
                job_id = %job.id,
                ip = %job.device.ip,
                output_file = %job.output_file,
                duration_ms,
                "Backup completed"
            );
            BackupOutcome {
                job,
                duration_ms: Some(duration_ms),
                error: None,
            }
        }
        Err(e) => {
            error!(
                job_id = %job.id,
                ip = %job.device.ip,
                error = %e,
                "Error backing up device"
            );
            BackupOutcome {
                job,
                duration_ms: None,
                error: Some(e),
            }
        }
    };

    if let Some(sink) = outcomes {
        // Receiver gone only during shutdown
        let _ = sink.send(outcome);
    }
}

/// Consume outcomes and log running totals until every sender is dropped.
///
/// Returns `(succeeded, failed)`.
pub async fn tally_outcomes(mut rx: UnboundedReceiver<BackupOutcome>) -> (u64, u64) {
    let (mut succeeded, mut failed) = (0u64, 0u64);

    while let Some(outcome) = rx.recv().await {
        if outcome.is_success() {
            succeeded += 1;
        } else {
            failed += 1;
        }
        info!(succeeded, failed, "Backup totals since startup");
    }

    (succeeded, failed)
}
