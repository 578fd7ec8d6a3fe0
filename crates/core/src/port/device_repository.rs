// Device Repository Port (Interface)

use crate::domain::{Device, DeviceId, NewDevice};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for device persistence
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// All devices in insertion order
    async fn list_all(&self) -> Result<Vec<Device>>;

    /// Insert a new device and return its assigned id
    async fn insert(&self, device: &NewDevice) -> Result<DeviceId>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory device table with an "unreachable" switch
    #[derive(Default)]
    pub struct InMemoryDeviceRepository {
        devices: Mutex<Vec<Device>>,
        unavailable: AtomicBool,
    }

    impl InMemoryDeviceRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every call fail with a storage error (or recover)
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AppError::Database("device store unreachable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DeviceRepository for InMemoryDeviceRepository {
        async fn list_all(&self) -> Result<Vec<Device>> {
            self.check_available()?;
            Ok(self.devices.lock().unwrap().clone())
        }

        async fn insert(&self, device: &NewDevice) -> Result<DeviceId> {
            self.check_available()?;
            let mut devices = self.devices.lock().unwrap();
            let id = devices.last().map(|d| d.id + 1).unwrap_or(1);
            devices.push(device.clone().with_id(id));
            Ok(id)
        }
    }
}
