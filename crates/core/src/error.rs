// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Persistence layer unreachable or a constraint was violated (StorageError)
    #[error("Storage error: {0}")]
    Database(String),

    /// Malformed cron expression, raised when arming the trigger
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] crate::domain::CronParseError),

    /// External executor capability failed for one device
    #[error("Backup execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
