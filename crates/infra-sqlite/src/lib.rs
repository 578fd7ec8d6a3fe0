// ddbackup Infrastructure - SQLite Adapter
// Implements: DeviceRepository, ScheduleRepository

mod connection;
mod device_repository;
mod error;
mod migration;
mod schedule_repository;

pub use connection::create_pool;
pub use device_repository::SqliteDeviceRepository;
pub use migration::run_migrations;
pub use schedule_repository::SqliteScheduleRepository;

// Note: sqlx::Error conversion is handled by a helper function (error::map_sqlx_error)
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
