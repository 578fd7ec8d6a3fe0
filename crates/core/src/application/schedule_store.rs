// Schedule Store - the single global cron expression

use crate::domain::DEFAULT_CRON;
use crate::error::Result;
use crate::port::ScheduleRepository;
use std::sync::Arc;

/// Schedule Store
///
/// Persists whatever it is given; syntax is only checked when the trigger is armed.
pub struct ScheduleStore {
    repo: Arc<dyn ScheduleRepository>,
}

impl ScheduleStore {
    pub fn new(repo: Arc<dyn ScheduleRepository>) -> Self {
        Self { repo }
    }

    /// Current expression, storing the default on first use
    pub async fn get_schedule(&self) -> Result<String> {
        self.repo.get_or_insert(DEFAULT_CRON).await
    }

    /// Overwrite the stored expression
    pub async fn set_schedule(&self, expr: &str) -> Result<()> {
        self.repo.save(expr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::schedule_repository::mocks::InMemoryScheduleRepository;

    #[tokio::test]
    async fn test_default_is_created_and_persisted() {
        let repo = Arc::new(InMemoryScheduleRepository::new());
        let store = ScheduleStore::new(repo.clone());

        assert_eq!(repo.stored(), None);
        assert_eq!(store.get_schedule().await.unwrap(), "0 2 * * *");
        assert_eq!(repo.stored().as_deref(), Some("0 2 * * *"));
        assert_eq!(store.get_schedule().await.unwrap(), "0 2 * * *");
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let repo = Arc::new(InMemoryScheduleRepository::with_cron("0 2 * * *"));
        let store = ScheduleStore::new(repo);

        store.set_schedule("*/5 * * * *").await.unwrap();
        assert_eq!(store.get_schedule().await.unwrap(), "*/5 * * * *");
    }

    #[tokio::test]
    async fn test_set_does_not_validate() {
        let store = ScheduleStore::new(Arc::new(InMemoryScheduleRepository::new()));

        tokio_test::assert_ok!(store.set_schedule("not a cron").await);
        assert_eq!(store.get_schedule().await.unwrap(), "not a cron");
    }
}
