// Application Layer - Use Cases and Business Logic

pub mod backup;
pub mod registry;
pub mod schedule_service;
pub mod schedule_store;
pub mod scheduler;

// Re-exports
pub use backup::{tally_outcomes, BackupExecutor, BackupOutcome};
pub use registry::DeviceRegistry;
pub use schedule_service::ScheduleService;
pub use schedule_store::ScheduleStore;
pub use scheduler::SchedulerController;
