// SQLite DeviceRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use ddbackup_core::domain::{Device, DeviceId, NewDevice};
use ddbackup_core::error::Result;
use ddbackup_core::port::DeviceRepository;
use sqlx::SqlitePool;

pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRepository for SqliteDeviceRepository {
    async fn list_all(&self) -> Result<Vec<Device>> {
        let rows: Vec<DeviceRow> =
            sqlx::query_as("SELECT id, user, ip, outputFile FROM devices ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DeviceRow::into_device).collect())
    }

    async fn insert(&self, device: &NewDevice) -> Result<DeviceId> {
        let result = sqlx::query("INSERT INTO devices (user, ip, outputFile) VALUES (?, ?, ?)")
            .bind(&device.user)
            .bind(&device.ip)
            .bind(&device.output_file)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }
}

/// SQLite row representation (columns are nullable in older databases)
#[derive(Debug, sqlx::FromRow)]
struct DeviceRow {
    id: i64,
    user: Option<String>,
    ip: Option<String>,
    #[sqlx(rename = "outputFile")]
    output_file: Option<String>,
}

impl DeviceRow {
    fn into_device(self) -> Device {
        Device {
            id: self.id,
            user: self.user.unwrap_or_default(),
            ip: self.ip.unwrap_or_default(),
            output_file: self.output_file.unwrap_or_default(),
        }
    }
}
