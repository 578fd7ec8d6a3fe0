// Schedule Repository Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for the singleton schedule row
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Read the stored expression, atomically inserting `default` if the row is missing
    async fn get_or_insert(&self, default: &str) -> Result<String>;

    /// Overwrite the stored expression (creates the row if missing)
    async fn save(&self, cron: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory schedule row
    #[derive(Default)]
    pub struct InMemoryScheduleRepository {
        cron: Mutex<Option<String>>,
        unavailable: AtomicBool,
        commit_delay: Mutex<Option<Duration>>,
    }

    impl InMemoryScheduleRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start with an existing row
        pub fn with_cron(cron: impl Into<String>) -> Self {
            Self {
                cron: Mutex::new(Some(cron.into())),
                ..Self::default()
            }
        }

        /// The next `save` writes at once but returns only after `delay` (tokio time)
        pub fn delay_next_save(&self, delay: Duration) {
            *self.commit_delay.lock().unwrap() = Some(delay);
        }

        /// Raw row contents, without the default-on-read behavior
        pub fn stored(&self) -> Option<String> {
            self.cron.lock().unwrap().clone()
        }

        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AppError::Database("schedule store unreachable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ScheduleRepository for InMemoryScheduleRepository {
        async fn get_or_insert(&self, default: &str) -> Result<String> {
            self.check_available()?;
            let mut cron = self.cron.lock().unwrap();
            Ok(cron.get_or_insert_with(|| default.to_string()).clone())
        }

        async fn save(&self, cron: &str) -> Result<()> {
            self.check_available()?;
            *self.cron.lock().unwrap() = Some(cron.to_string());

            let delay = self.commit_delay.lock().unwrap().take();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        }
    }
}
