// Port Layer - Interfaces for external dependencies

pub mod device_repository;
pub mod id_provider; // For deterministic testing
pub mod remote_executor;
pub mod schedule_repository;
pub mod time_provider;

// Re-exports
pub use device_repository::DeviceRepository;
pub use id_provider::IdProvider;
pub use remote_executor::{ExecutionError, ExecutionResult, ExecutionStatus, RemoteExecutor};
pub use schedule_repository::ScheduleRepository;
pub use time_provider::TimeProvider;
