// Domain Layer - Pure business logic and entities

pub mod backup_job;
pub mod cron;
pub mod device;
pub mod schedule;

// Re-exports
pub use backup_job::{format_output_file, BackupCommand, BackupJob, JobId};
pub use cron::{CronExpr, CronParseError};
pub use device::{Device, DeviceId, NewDevice};
pub use schedule::{DEFAULT_CRON, SCHEDULE_ROW_ID};
