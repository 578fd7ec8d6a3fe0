// Device Registry - registration and listing of backup targets

use crate::domain::{Device, DeviceId, NewDevice};
use crate::error::Result;
use crate::port::DeviceRepository;
use std::sync::Arc;
use tracing::info;

/// Device Registry
///
/// Values are accepted as submitted: no format validation of user or address.
pub struct DeviceRegistry {
    repo: Arc<dyn DeviceRepository>,
}

impl DeviceRegistry {
    pub fn new(repo: Arc<dyn DeviceRepository>) -> Self {
        Self { repo }
    }

    /// All registered devices in insertion order
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        self.repo.list_all().await
    }

    /// Register a device and return its assigned id
    pub async fn add_device(
        &self,
        user: impl Into<String>,
        ip: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Result<DeviceId> {
        let device = NewDevice::new(user, ip, output_file);
        let id = self.repo.insert(&device).await?;

        info!(device_id = id, user = %device.user, ip = %device.ip, "Device registered");
        Ok(id)
    }
}
