// Device Domain Model

use serde::{Deserialize, Serialize};

/// Device ID (assigned by the persistence layer)
pub type DeviceId = i64;

/// A remote machine whose block device is backed up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Remote login identity
    pub user: String,
    /// Remote network address or hostname
    pub ip: String,
    /// User-supplied output hint. Stored and displayed, never used to build the backup path.
    pub output_file: String,
}

impl Device {
    /// `user@ip` target for the remote shell
    pub fn ssh_target(&self) -> String {
        format!("{}@{}", self.user, self.ip)
    }
}

/// Registration input (no id yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub user: String,
    pub ip: String,
    pub output_file: String,
}

impl NewDevice {
    pub fn new(
        user: impl Into<String>,
        ip: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            ip: ip.into(),
            output_file: output_file.into(),
        }
    }

    /// Attach the id assigned by storage
    pub fn with_id(self, id: DeviceId) -> Device {
        Device {
            id,
            user: self.user,
            ip: self.ip,
            output_file: self.output_file,
        }
    }
}
