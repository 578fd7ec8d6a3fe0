//! Shared handler state

use ddbackup_core::application::{DeviceRegistry, ScheduleService};
use std::sync::Arc;

/// Services injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DeviceRegistry>,
    pub schedules: Arc<ScheduleService>,
}

impl AppState {
    pub fn new(registry: Arc<DeviceRegistry>, schedules: Arc<ScheduleService>) -> Self {
        Self {
            registry,
            schedules,
        }
    }
}
