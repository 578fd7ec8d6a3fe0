// SQLite ScheduleRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use ddbackup_core::domain::SCHEDULE_ROW_ID;
use ddbackup_core::error::Result;
use ddbackup_core::port::ScheduleRepository;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepository {
    async fn get_or_insert(&self, default: &str) -> Result<String> {
        // OR IGNORE: concurrent first reads cannot create a second row
        sqlx::query("INSERT OR IGNORE INTO schedule (id, cron) VALUES (?, ?)")
            .bind(SCHEDULE_ROW_ID)
            .bind(default)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let cron: Option<String> = sqlx::query_scalar("SELECT cron FROM schedule WHERE id = ?")
            .bind(SCHEDULE_ROW_ID)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(cron.unwrap_or_else(|| default.to_string()))
    }

    async fn save(&self, cron: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO schedule (id, cron) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET cron = excluded.cron
            "#,
        )
        .bind(SCHEDULE_ROW_ID)
        .bind(cron)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn row_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM schedule")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_or_insert_creates_default_once() {
        let pool = setup_test_db().await;
        let repo = SqliteScheduleRepository::new(pool.clone());

        assert_eq!(repo.get_or_insert("0 2 * * *").await.unwrap(), "0 2 * * *");
        assert_eq!(repo.get_or_insert("1 1 * * *").await.unwrap(), "0 2 * * *");
        assert_eq!(row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_save_overwrites_singleton_row() {
        let pool = setup_test_db().await;
        let repo = SqliteScheduleRepository::new(pool.clone());
        repo.get_or_insert("0 2 * * *").await.unwrap();

        repo.save("*/5 * * * *").await.unwrap();
        repo.save("*/10 * * * *").await.unwrap();

        assert_eq!(repo.get_or_insert("0 2 * * *").await.unwrap(), "*/10 * * * *");
        assert_eq!(row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_save_before_first_read_creates_row() {
        let pool = setup_test_db().await;
        let repo = SqliteScheduleRepository::new(pool.clone());

        repo.save("*/5 * * * *").await.unwrap();

        assert_eq!(repo.get_or_insert("0 2 * * *").await.unwrap(), "*/5 * * * *");
        assert_eq!(row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_invalid_expression_stored_verbatim() {
        let repo = SqliteScheduleRepository::new(setup_test_db().await);

        repo.save("definitely not cron").await.unwrap();
        assert_eq!(
            repo.get_or_insert("0 2 * * *").await.unwrap(),
            "definitely not cron"
        );
    }
}
